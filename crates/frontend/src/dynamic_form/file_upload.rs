//! File field widget: stored files, freshly uploaded ones and the picker

use contracts::dynamic_form::hydrate_attrs::{FileAttrs, READ_FILES_UPDATED};
use contracts::dynamic_form::{
    hydrate_on, AttributeBag, ExtraAttrs, FieldDescriptor, FieldEvent, FieldKind, FileEntry, FileValueType,
    ServerFile, UploadFile,
};
use contracts::error::FetchError;
use contracts::shared::global::dynamic_error;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlInputElement;

use super::field::update_field;
use crate::shared::icons::icon;

async fn read_file(file: web_sys::File) -> Result<UploadFile, FetchError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| FetchError::new(format!("Lecture du fichier impossible: {:?}", e)))?;
    Ok(UploadFile {
        name: file.name(),
        mime_type: file.type_(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

/// Replace the stored files of the field through its event map
fn emit_read_files(form: RwSignal<Vec<FieldDescriptor>>, index: usize, files: Vec<ServerFile>) {
    form.update(|fields| {
        if let Some(field) = fields.get_mut(index) {
            let events = hydrate_on(Some(field));
            if !events.dispatch(READ_FILES_UPDATED, field, FieldEvent::ReadFilesUpdated(files)) {
                log::warn!("field '{}' does not handle {}", field.id, READ_FILES_UPDATED);
            }
        }
    });
}

/// Files counted against the limit: held by the field plus uploads not resolved yet
fn held_files(field: Option<&FieldDescriptor>, in_flight: usize) -> usize {
    field.map_or(0, FieldDescriptor::file_count) + in_flight
}

/// Move the element at `from` one step up (`-1`) or down (`1`)
fn move_file(files: &[ServerFile], from: usize, step: isize) -> Option<Vec<ServerFile>> {
    let to = from.checked_add_signed(step)?;
    if to >= files.len() || from >= files.len() {
        return None;
    }
    let mut reordered = files.to_vec();
    reordered.swap(from, to);
    Some(reordered)
}

#[component]
pub fn FileUpload(
    form: RwSignal<Vec<FieldDescriptor>>,
    index: usize,
    attrs: Memo<Option<AttributeBag>>,
) -> impl IntoView {
    let file_attrs = Memo::new(move |_| {
        attrs.with(|b| match b.as_ref().map(|b| &b.extra) {
            Some(ExtraAttrs::File(a)) => Some(a.clone()),
            _ => None,
        })
    });
    let (error, set_error) = signal::<Option<String>>(None);
    let (busy, set_busy) = signal(false);
    let in_flight = StoredValue::new(0usize);

    let entries = Memo::new(move |_| {
        form.with(|fields| match fields.get(index).map(|f| &f.kind) {
            Some(FieldKind::File(field)) => (
                field.value.clone(),
                field.pending.iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
            ),
            _ => (Vec::new(), Vec::new()),
        })
    });

    let delete_stored = move |file: ServerFile| {
        let Some(a) = file_attrs.get_untracked() else {
            return;
        };
        let remaining: Vec<ServerFile> = a.read_files.iter().filter(|f| f.id != file.id).cloned().collect();
        match a.deleter {
            Some(deleter) => spawn_local(async move {
                set_busy.set(true);
                match deleter.call(file.id).await {
                    Ok(()) => emit_read_files(form, index, remaining),
                    Err(err) => {
                        log::error!("file delete failed: {}", err);
                        set_error.set(Some(dynamic_error(&err)));
                    }
                }
                set_busy.set(false);
            }),
            None => emit_read_files(form, index, remaining),
        }
    };

    let reorder_stored = move |from: usize, step: isize| {
        let Some(a) = file_attrs.get_untracked() else {
            return;
        };
        let Some(reordered) = move_file(&a.read_files, from, step) else {
            return;
        };
        match a.reorderer {
            Some(reorderer) => spawn_local(async move {
                let owner = reordered.first().map_or(0, |f| f.model_id);
                let ids = reordered.iter().map(|f| f.id).collect();
                set_busy.set(true);
                match reorderer.call((owner, ids)).await {
                    Ok(()) => emit_read_files(form, index, reordered),
                    Err(err) => {
                        log::error!("file reorder failed: {}", err);
                        set_error.set(Some(dynamic_error(&err)));
                    }
                }
                set_busy.set(false);
            }),
            None => emit_read_files(form, index, reordered),
        }
    };

    let remove_local = move |position: usize, pending: bool| {
        update_field(form, index, |field| {
            if let FieldKind::File(f) = &mut field.kind {
                let list_len = if pending { f.pending.len() } else { f.value.len() };
                if position < list_len {
                    if pending {
                        f.pending.remove(position);
                    } else {
                        f.value.remove(position);
                    }
                }
            }
            Ok(())
        });
    };

    let accept_file = move |attrs: FileAttrs, file: UploadFile| {
        let already = form.with_untracked(|fields| held_files(fields.get(index), in_flight.get_value()));
        if let Err(message) = attrs.check_upload(already, &file) {
            set_error.set(Some(message));
            return;
        }
        match (attrs.value_type, attrs.uploader) {
            (FileValueType::DirectUpload, Some(uploader)) => {
                in_flight.update_value(|n| *n += 1);
                set_busy.set(true);
                spawn_local(async move {
                    match uploader.call(file).await {
                        Ok(temp) => update_field(form, index, |field| {
                            if let FieldKind::File(f) = &mut field.kind {
                                f.value.push(FileEntry::Temp(temp));
                            }
                            Ok(())
                        }),
                        Err(err) => {
                            log::error!("file upload failed: {}", err);
                            set_error.set(Some(dynamic_error(&err)));
                        }
                    }
                    in_flight.update_value(|n| *n = n.saturating_sub(1));
                    set_busy.set(in_flight.get_value() > 0);
                });
            }
            (FileValueType::DirectUpload, None) => {
                log::warn!("file field at index {} has no uploader", index);
            }
            (FileValueType::FormData, _) => update_field(form, index, |field| {
                if let FieldKind::File(f) = &mut field.kind {
                    f.pending.push(file);
                }
                Ok(())
            }),
        }
    };

    let on_pick = move |ev: leptos::ev::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        let Some(list) = input.files() else {
            return;
        };
        let Some(a) = file_attrs.get_untracked() else {
            return;
        };
        set_error.set(None);
        let picked: Vec<web_sys::File> = (0..list.length()).filter_map(|i| list.get(i)).collect();
        input.set_value("");
        spawn_local(async move {
            for file in picked {
                match read_file(file).await {
                    Ok(upload) => accept_file(a.clone(), upload),
                    Err(err) => set_error.set(Some(err.message)),
                }
            }
        });
    };

    let input_id = move || attrs.with(|b| b.as_ref().and_then(|b| b.id.clone()).unwrap_or_default());
    let accept = move || file_attrs.with(|a| a.as_ref().map_or("", |a| a.accepted_file_types.accept()));
    let multiple = move || file_attrs.with(|a| a.as_ref().map_or(false, |a| a.allow_multiple.unwrap_or(false)));
    let disabled = move || busy.get() || attrs.with(|b| b.as_ref().map_or(false, |b| b.disabled));

    view! {
        <div class="file-upload">
            <ul class="file-upload__stored">
                {move || {
                    let Some(a) = file_attrs.get() else {
                        return Vec::new();
                    };
                    let count = a.read_files.len();
                    a.read_files
                        .iter()
                        .enumerate()
                        .map(|(position, file)| {
                            let preview = a.preview_url(file).to_string();
                            let name = file.file_name.clone();
                            let original = file.original_url.clone();
                            let target = file.clone();
                            let first = position == 0;
                            let last = position + 1 >= count;
                            view! {
                                <li class="file-upload__item">
                                    <a href=original target="_blank">
                                        <img class="file-upload__preview" src=preview alt=name.clone() />
                                    </a>
                                    <span class="file-upload__name">{name}</span>
                                    <button
                                        type="button"
                                        class="button button--icon"
                                        disabled=move || busy.get() || first
                                        on:click=move |_| reorder_stored(position, -1)
                                    >
                                        {icon("chevron-up")}
                                    </button>
                                    <button
                                        type="button"
                                        class="button button--icon"
                                        disabled=move || busy.get() || last
                                        on:click=move |_| reorder_stored(position, 1)
                                    >
                                        {icon("chevron-down")}
                                    </button>
                                    <button
                                        type="button"
                                        class="button button--icon button--danger"
                                        disabled=move || busy.get()
                                        on:click=move |_| delete_stored(target.clone())
                                    >
                                        {icon("trash")}
                                    </button>
                                </li>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </ul>
            <ul class="file-upload__new">
                {move || {
                    let (uploaded, pending) = entries.get();
                    let uploaded_views = uploaded.into_iter().enumerate().map(|(position, entry)| {
                        view! {
                            <li class="file-upload__item">
                                <span class="file-upload__name">{entry.name().to_string()}</span>
                                <button type="button" class="button button--icon" on:click=move |_| remove_local(position, false)>
                                    {icon("x")}
                                </button>
                            </li>
                        }
                        .into_any()
                    });
                    let pending_views = pending.into_iter().enumerate().map(|(position, name)| {
                        view! {
                            <li class="file-upload__item file-upload__item--pending">
                                <span class="file-upload__name">{name}</span>
                                <button type="button" class="button button--icon" on:click=move |_| remove_local(position, true)>
                                    {icon("x")}
                                </button>
                            </li>
                        }
                        .into_any()
                    });
                    uploaded_views.chain(pending_views).collect::<Vec<_>>()
                }}
            </ul>
            <label class="button button--secondary file-upload__picker" for=input_id>
                {icon("upload")}
                <span>"Choisir un fichier"</span>
            </label>
            <input
                id=input_id
                type="file"
                class="file-upload__input"
                accept=accept
                multiple=multiple
                disabled=disabled
                on:change=on_pick
            />
            {move || error.get().map(|message| view! { <small class="form__error">{message}</small> })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::dynamic_form::hydrate_attrs;
    use contracts::dynamic_form::FileField;

    fn stored(id: u64) -> ServerFile {
        ServerFile {
            id,
            model_id: 3,
            file_name: format!("{}.jpg", id),
            ..ServerFile::default()
        }
    }

    #[test]
    fn test_move_file() {
        let files = vec![stored(1), stored(2), stored(3)];

        let down = move_file(&files, 0, 1).unwrap();
        assert_eq!(down.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 1, 3]);

        let up = move_file(&files, 2, -1).unwrap();
        assert_eq!(up.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 3, 2]);

        assert!(move_file(&files, 0, -1).is_none());
        assert!(move_file(&files, 2, 1).is_none());
    }

    #[test]
    fn test_running_uploads_count_against_limit() {
        let field = FieldDescriptor::new(
            "photos",
            "Photos",
            FieldKind::File(FileField {
                allow_multiple: Some(true),
                file_limit: Some(2),
                read_files: Some(vec![stored(1)]),
                ..FileField::default()
            }),
        );
        let attrs = match hydrate_attrs("f", &field, None).extra {
            ExtraAttrs::File(attrs) => attrs,
            other => panic!("unexpected attrs {:?}", other),
        };
        let picked = |name: &str| UploadFile {
            name: name.to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![1],
        };

        // два файла выбраны разом, первая загрузка ещё не завершилась
        let mut in_flight = 0;
        assert!(attrs.check_upload(held_files(Some(&field), in_flight), &picked("a.png")).is_ok());
        in_flight += 1;
        assert_eq!(held_files(Some(&field), in_flight), 2);
        assert!(attrs.check_upload(held_files(Some(&field), in_flight), &picked("b.png")).is_err());

        assert_eq!(held_files(None, 0), 0);
    }
}
