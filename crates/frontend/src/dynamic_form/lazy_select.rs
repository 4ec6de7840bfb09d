//! Select whose options come page by page from a caller fetcher

use contracts::datatable::PageRequest;
use contracts::dynamic_form::hydrate_attrs::LazySelectAttrs;
use contracts::dynamic_form::value::to_display_string;
use contracts::dynamic_form::{AttributeBag, ExtraAttrs, FieldDescriptor, Record};
use contracts::shared::global::dynamic_error;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use thaw::{Spinner, SpinnerSize};

use super::field::update_field;
use crate::shared::config::use_library_config;
use crate::shared::icons::icon;
use crate::shared::timeout::async_timeout;

const SEARCH_DEBOUNCE_MS: u32 = 300;

fn record_text(record: &Record, key: Option<&str>, default_key: &str) -> String {
    record
        .get(key.unwrap_or(default_key))
        .map(to_display_string)
        .unwrap_or_default()
}

#[component]
pub fn LazySelect(
    form: RwSignal<Vec<FieldDescriptor>>,
    index: usize,
    /// Hydrated attributes of the field
    attrs: Memo<Option<AttributeBag>>,
) -> impl IntoView {
    let lazy_attrs = move || {
        attrs.with_untracked(|b| match b.as_ref().map(|b| &b.extra) {
            Some(ExtraAttrs::LazySelect(a)) => Some(a.clone()),
            _ => None,
        })
    };
    let current_value = move || form.with(|f| f.get(index).map(|field| field.value()).unwrap_or(Value::Null));

    let options = RwSignal::new(Vec::<Record>::new());
    let page = RwSignal::new(1u64);
    let is_last_page = RwSignal::new(true);
    let (loading, set_loading) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let (query, set_query) = signal(String::new());
    let (open, set_open) = signal(false);
    let selected_label = RwSignal::new(None::<String>);
    let generation = StoredValue::new(0u64);
    let page_size = use_library_config().pagination.default_page_limit as u64;

    let load_page = move |target: u64, reset: bool| {
        let Some(LazySelectAttrs { fetcher: Some(fetcher), .. }) = lazy_attrs() else {
            log::warn!("lazyselect field at index {} has no fetcher", index);
            return;
        };
        let search = query.get_untracked();
        spawn_local(async move {
            set_loading.set(true);
            set_error.set(None);

            let mut request = PageRequest::new(target, page_size);
            if !search.trim().is_empty() {
                request.search = Some(search.trim().to_string());
            }

            match fetcher.call(request).await {
                Ok(data) => {
                    is_last_page.set(data.is_last_page());
                    page.set(data.current_page.max(target));
                    if reset {
                        options.set(data.data);
                    } else {
                        options.update(|current| current.extend(data.data));
                    }
                }
                Err(err) => {
                    log::error!("lazyselect fetch failed: {}", err);
                    set_error.set(Some(dynamic_error(&err)));
                }
            }
            set_loading.set(false);
        });
    };

    // Подпись для уже заданного значения (предзаполнение)
    let initial = current_value();
    if !initial.is_null() {
        if let Some(LazySelectAttrs { one_fetcher: Some(one_fetcher), select_label, .. }) = lazy_attrs() {
            spawn_local(async move {
                match one_fetcher.call(initial).await {
                    Ok(record) => selected_label.set(Some(record_text(&record, select_label.as_deref(), "label"))),
                    Err(err) => log::error!("lazyselect one_fetcher failed: {}", err),
                }
            });
        }
    }

    load_page(1, true);

    let on_search = move |value: String| {
        set_query.set(value);
        let current = generation.get_value() + 1;
        generation.set_value(current);
        spawn_local(async move {
            async_timeout(SEARCH_DEBOUNCE_MS).await;
            if generation.get_value() == current {
                load_page(1, true);
            }
        });
    };

    let choose = move |record: Record| {
        let Some(a) = lazy_attrs() else {
            return;
        };
        let value = record
            .get(a.select_value.as_deref().unwrap_or("value"))
            .cloned()
            .unwrap_or(Value::Null);
        selected_label.set(Some(record_text(&record, a.select_label.as_deref(), "label")));
        update_field(form, index, |field| field.set_value(value));
        set_open.set(false);
    };

    let display = move || {
        selected_label
            .get()
            .unwrap_or_else(|| to_display_string(&current_value()))
    };
    let input_id = move || lazy_attrs().map(|a| a.input_id).unwrap_or_default();
    let filter_enabled = move || lazy_attrs().and_then(|a| a.filter).unwrap_or(true);
    let disabled = move || attrs.with(|b| b.as_ref().map_or(false, |b| b.disabled));
    let invalid_class = move || {
        if lazy_attrs().map_or(false, |a| a.invalid) {
            "lazy-select lazy-select--invalid"
        } else {
            "lazy-select"
        }
    };

    view! {
        <div class=invalid_class>
            <button
                id=input_id
                type="button"
                class="form__select lazy-select__toggle"
                disabled=disabled
                on:click=move |_| set_open.update(|o| *o = !*o)
            >
                <span>{display}</span>
                {icon("chevron-down")}
            </button>
            <Show when=move || open.get()>
                <div class="lazy-select__panel">
                    {filter_enabled().then(|| view! {
                        <input
                            type="search"
                            class="form__input lazy-select__filter"
                            prop:value=move || query.get()
                            on:input=move |ev| on_search(event_target_value(&ev))
                        />
                    })}
                    <ul class="lazy-select__options">
                        {move || {
                            let label_key = lazy_attrs().and_then(|a| a.select_label);
                            options
                                .get()
                                .into_iter()
                                .map(|record| {
                                    let text = record_text(&record, label_key.as_deref(), "label");
                                    view! {
                                        <li class="lazy-select__option" on:click=move |_| choose(record.clone())>
                                            {text}
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                    {move || error.get().map(|message| view! {
                        <small class="form__error">{message}</small>
                    })}
                    {move || if loading.get() {
                        view! { <Spinner size=SpinnerSize::Small /> }.into_any()
                    } else if !is_last_page.get() {
                        view! {
                            <button
                                type="button"
                                class="button button--ghost button--small"
                                on:click=move |_| load_page(page.get_untracked() + 1, false)
                            >
                                "Charger plus"
                            </button>
                        }
                        .into_any()
                    } else {
                        ().into_any()
                    }}
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_text() {
        let record = json!({ "id": 7, "name": "Fianarantsoa" }).as_object().cloned().unwrap();
        assert_eq!(record_text(&record, Some("name"), "label"), "Fianarantsoa");
        assert_eq!(record_text(&record, None, "id"), "7");
        assert_eq!(record_text(&record, Some("missing"), "label"), "");
    }
}
