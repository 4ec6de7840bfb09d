//! Rendering of a single field descriptor
//!
//! The widget is rebuilt only when the field type changes; values, errors
//! and attributes flow into it through signals so that typing never
//! re-creates the input element.

use contracts::dynamic_form::hydrate_attrs::{
    option_pairs, resolve_option, resolve_tree_option, tree_option_rows,
};
use contracts::dynamic_form::value::to_display_string;
use contracts::dynamic_form::{hydrate_attrs, Alignment, AttributeBag, ErrorMap, ExtraAttrs, FieldDescriptor};
use contracts::error::FormError;
use leptos::prelude::*;
use serde_json::Value;
use thaw::{Badge, BadgeAppearance, BadgeColor};

use super::file_upload::FileUpload;
use super::lazy_select::LazySelect;
use crate::shared::components::ui::select::filter_options;
use crate::shared::components::ui::{CheckboxGroup, Input, RadioGroup, Select, Textarea};
use crate::shared::config::use_library_config;

/// Apply `change` to the field at `index`; failed conversions keep the old value
pub(crate) fn update_field<F>(form: RwSignal<Vec<FieldDescriptor>>, index: usize, change: F)
where
    F: FnOnce(&mut FieldDescriptor) -> Result<(), FormError>,
{
    form.update(|fields| {
        if let Some(field) = fields.get_mut(index) {
            if let Err(err) = change(field) {
                log::warn!("{}", err);
            }
        }
    });
}

/// Format `raw` with an input mask: `9` digit, `a` letter, `*` either,
/// anything else is a literal
pub fn apply_mask(mask: &str, raw: &str) -> String {
    let mut input = raw.chars().peekable();
    let mut out = String::new();

    for slot in mask.chars() {
        if input.peek().is_none() {
            break;
        }
        let accepts: Option<fn(&char) -> bool> = match slot {
            '9' => Some(|c: &char| c.is_ascii_digit()),
            'a' => Some(|c: &char| c.is_alphabetic()),
            '*' => Some(|c: &char| c.is_alphanumeric()),
            _ => None,
        };
        match accepts {
            Some(accepts) => {
                // недопустимые символы пропускаем
                let next = input.by_ref().find(|c| accepts(c));
                match next {
                    Some(c) => out.push(c),
                    None => break,
                }
            }
            None => {
                out.push(slot);
                if input.peek() == Some(&slot) {
                    input.next();
                }
            }
        }
    }
    out
}

pub fn is_mask_complete(mask: &str, value: &str) -> bool {
    value.chars().count() == mask.chars().count()
}

/// `(value, label)` rows of any option-based widget
fn option_rows(extra: &ExtraAttrs) -> Vec<(String, String)> {
    match extra {
        ExtraAttrs::Select(a) => option_pairs(&a.options, a.option_value.as_deref(), a.option_label.as_deref()),
        ExtraAttrs::MultiSelect(a) => option_pairs(
            &a.select.options,
            a.select.option_value.as_deref(),
            a.select.option_label.as_deref(),
        ),
        ExtraAttrs::TreeSelect(a) => tree_option_rows(
            &a.options,
            a.select_value.as_deref(),
            a.select_label.as_deref(),
            a.children_key.as_deref(),
        )
        .into_iter()
        .map(|(value, label, depth)| (value, format!("{}{}", "\u{a0}\u{a0}".repeat(depth), label)))
        .collect(),
        ExtraAttrs::Choice(a) => option_pairs(&a.options, a.select_value.as_deref(), a.select_label.as_deref()),
        _ => Vec::new(),
    }
}

/// Typed option value for the string a widget reported
fn resolve_raw(extra: &ExtraAttrs, raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    let resolved = match extra {
        ExtraAttrs::Select(a) => resolve_option(&a.options, a.option_value.as_deref(), raw),
        ExtraAttrs::MultiSelect(a) => resolve_option(&a.select.options, a.select.option_value.as_deref(), raw),
        ExtraAttrs::TreeSelect(a) => {
            resolve_tree_option(&a.options, a.select_value.as_deref(), a.children_key.as_deref(), raw)
        }
        ExtraAttrs::Choice(a) => resolve_option(&a.options, a.select_value.as_deref(), raw),
        _ => None,
    };
    resolved.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn widget_class(bag: &AttributeBag) -> String {
    match &bag.extra {
        ExtraAttrs::Number(a) => a.input_class.clone(),
        ExtraAttrs::Password(a) => a.input_class.clone(),
        ExtraAttrs::Mask(a) => a.input_class.clone(),
        ExtraAttrs::Select(a) => a.input_class.clone(),
        ExtraAttrs::MultiSelect(a) => a.select.input_class.clone(),
        ExtraAttrs::TreeSelect(a) => a.input_class.clone(),
        ExtraAttrs::LazySelect(a) => a.input_class.clone(),
        ExtraAttrs::Date(a) => format!("{} {}", bag.class, a.input_class.clone().unwrap_or_default()),
        _ => bag.class.clone(),
    }
}

#[component]
pub fn DynamicField(
    /// Form holding the field
    form: RwSignal<Vec<FieldDescriptor>>,
    /// Position of the field in the form
    index: usize,
    /// Prefix of the DOM ids
    #[prop(into)]
    prefix: String,
    /// Validation messages by field id
    #[prop(into)]
    errors: Signal<ErrorMap>,
    /// Renders `template` fields
    #[prop(default = None)]
    template: Option<Callback<FieldDescriptor, AnyView>>,
) -> impl IntoView {
    let item = Memo::new(move |_| form.with(|fields| fields.get(index).cloned()));
    let bag = Memo::new(move |_| {
        item.with(|item| {
            item.as_ref()
                .map(|item| errors.with(|e| hydrate_attrs(&prefix, item, Some(e))))
        })
    });
    let type_name = Memo::new(move |_| item.with(|i| i.as_ref().map(|i| i.type_name())));

    let label = move || item.with(|i| i.as_ref().map(|i| i.label.clone()).unwrap_or_default());
    let container_class = move || {
        item.with(|i| {
            let extra = i.as_ref().map(|i| i.container_class.clone()).unwrap_or_default();
            format!("dynamic-field {}", extra)
        })
    };
    let error = Signal::derive(move || {
        item.with(|i| i.as_ref().and_then(|i| errors.with(|e| e.get(&i.id).cloned())))
    });

    let text = Signal::derive(move || {
        item.with(|i| i.as_ref().map(|i| to_display_string(&i.value())).unwrap_or_default())
    });
    let list = Signal::derive(move || {
        item.with(|i| match i.as_ref().map(|i| i.value()) {
            Some(Value::Array(items)) => items.iter().map(to_display_string).collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    });
    let dom_id = Signal::derive(move || bag.with(|b| b.as_ref().and_then(|b| b.dom_id().map(str::to_string))));
    let disabled = Signal::derive(move || bag.with(|b| b.as_ref().map(|b| b.disabled)));
    let invalid = Signal::derive(move || error.with(|e| Some(e.is_some())));
    let placeholder = Signal::derive(move || bag.with(|b| b.as_ref().and_then(|b| b.placeholder.clone())));
    let class = Signal::derive(move || bag.with(|b| b.as_ref().map(widget_class)));
    let options = Signal::derive(move || bag.with(|b| b.as_ref().map(|b| option_rows(&b.extra)).unwrap_or_default()));
    let horizontal = move || {
        bag.with_untracked(|b| match b.as_ref().map(|b| &b.extra) {
            Some(ExtraAttrs::Choice(a)) => a.alignment == Some(Alignment::Horizontal),
            _ => false,
        })
    };

    let on_text = Callback::new(move |raw: String| update_field(form, index, |field| field.set_input(&raw)));
    let on_option = Callback::new(move |raw: String| {
        let typed = bag.with_untracked(|b| b.as_ref().map(|b| resolve_raw(&b.extra, &raw)));
        update_field(form, index, |field| field.set_value(typed.unwrap_or(Value::Null)));
    });
    let on_toggle = Callback::new(move |(raw, checked): (String, bool)| {
        let typed = bag.with_untracked(|b| b.as_ref().map(|b| resolve_raw(&b.extra, &raw)));
        update_field(form, index, |field| {
            let mut values = match field.value() {
                Value::Array(items) => items,
                _ => Vec::new(),
            };
            values.retain(|v| to_display_string(v) != raw);
            if checked {
                values.push(typed.unwrap_or(Value::Null));
            }
            field.set_value(Value::Array(values))
        });
    });

    let mask_pattern = move || {
        bag.with_untracked(|b| match b.as_ref().map(|b| &b.extra) {
            Some(ExtraAttrs::Mask(a)) => (a.mask.clone().unwrap_or_default(), a.auto_clear),
            _ => (String::new(), false),
        })
    };
    let on_mask_input = Callback::new(move |raw: String| {
        let (mask, _) = mask_pattern();
        let formatted = if mask.is_empty() { raw } else { apply_mask(&mask, &raw) };
        update_field(form, index, |field| field.set_input(&formatted));
    });
    let on_mask_blur = Callback::new(move |value: String| {
        let (mask, auto_clear) = mask_pattern();
        if auto_clear && !mask.is_empty() && !is_mask_complete(&mask, &value) {
            update_field(form, index, |field| field.set_input(""));
        }
    });

    let (multi_query, set_multi_query) = signal(String::new());
    let empty_filter_message = use_library_config().form.empty_filter_message.clone();

    let widget = move || {
        let Some(kind) = type_name.get() else {
            return ().into_any();
        };
        let name = item.with_untracked(|i| i.as_ref().map(|i| i.id.clone()).unwrap_or_default());

        match kind {
            "input" | "date" => view! {
                <Input
                    value=text
                    on_input=on_text
                    input_type=if kind == "date" { "date" } else { "text" }
                    id=dom_id
                    placeholder=placeholder
                    disabled=disabled
                    invalid=invalid
                    class=class
                />
            }
            .into_any(),
            "password" => view! {
                <Input
                    value=text
                    on_input=on_text
                    input_type="password"
                    toggle_mask=true
                    autocomplete="current-password"
                    id=dom_id
                    placeholder=placeholder
                    disabled=disabled
                    invalid=invalid
                    class=class
                />
            }
            .into_any(),
            "number" => {
                let (prefix, suffix) = bag.with_untracked(|b| match b.as_ref().map(|b| &b.extra) {
                    Some(ExtraAttrs::Number(a)) => (a.prefix.clone(), a.suffix.clone()),
                    _ => (None, None),
                });
                view! {
                    <Input
                        value=text
                        on_input=on_text
                        input_type="number"
                        prefix=prefix
                        suffix=suffix
                        id=dom_id
                        placeholder=placeholder
                        disabled=disabled
                        invalid=invalid
                        class=class
                    />
                }
                .into_any()
            }
            "mask" => {
                let mask_placeholder = Signal::derive(move || {
                    placeholder.get().or_else(|| Some(mask_pattern().0).filter(|m| !m.is_empty()))
                });
                view! {
                    <Input
                        value=text
                        on_input=on_mask_input
                        on_blur=on_mask_blur
                        id=dom_id
                        placeholder=mask_placeholder
                        disabled=disabled
                        invalid=invalid
                        class=class
                    />
                }
                .into_any()
            }
            "textarea" => view! {
                <Textarea
                    value=text
                    on_input=on_text
                    id=dom_id
                    placeholder=placeholder
                    disabled=disabled
                    invalid=invalid
                    class=class
                />
            }
            .into_any(),
            "select" | "treeselect" => {
                let filter = bag.with_untracked(|b| match b.as_ref().map(|b| &b.extra) {
                    Some(ExtraAttrs::Select(a)) => a.filter.unwrap_or(false),
                    _ => false,
                });
                view! {
                    <Select
                        value=text
                        on_change=on_option
                        options=options
                        filter=filter
                        empty_filter_message=empty_filter_message.clone()
                        id=dom_id
                        placeholder=placeholder
                        disabled=disabled
                        invalid=invalid
                        class=class
                    />
                }
                .into_any()
            }
            "multiselect" => {
                let (filter, empty_message) = bag.with_untracked(|b| match b.as_ref().map(|b| &b.extra) {
                    Some(ExtraAttrs::MultiSelect(a)) => (a.select.filter.unwrap_or(false), a.empty_filter_message.clone()),
                    _ => (false, String::new()),
                });
                let visible = Signal::derive(move || options.with(|o| filter_options(o, &multi_query.get())));
                let chips = move || {
                    let selected = list.get();
                    let labels: Vec<String> = options.with(|o| {
                        o.iter()
                            .filter(|(value, _)| selected.contains(value))
                            .map(|(_, label)| label.clone())
                            .collect()
                    });
                    labels
                        .into_iter()
                        .map(|label| view! {
                            <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Brand>
                                {label}
                            </Badge>
                        })
                        .collect_view()
                };
                view! {
                    <div class=move || format!("multiselect {}", class.get().unwrap_or_default())>
                        <div class="multiselect__chips">{chips}</div>
                        {filter.then(|| view! {
                            <input
                                type="search"
                                class="form__input multiselect__filter"
                                prop:value=move || multi_query.get()
                                on:input=move |ev| set_multi_query.set(event_target_value(&ev))
                            />
                        })}
                        <CheckboxGroup
                            checked=list
                            on_toggle=on_toggle
                            options=visible
                            name=name
                            disabled=disabled
                        />
                        {move || visible.with(|v| v.is_empty()).then(|| view! {
                            <small class="form__hint">{empty_message.clone()}</small>
                        })}
                    </div>
                }
                .into_any()
            }
            "lazyselect" => view! {
                <LazySelect form=form index=index attrs=bag />
            }
            .into_any(),
            "radio" => view! {
                <RadioGroup
                    value=text
                    on_change=on_option
                    name=name
                    options=options
                    horizontal=horizontal()
                    disabled=disabled
                />
            }
            .into_any(),
            "checkbox" => view! {
                <CheckboxGroup
                    checked=list
                    on_toggle=on_toggle
                    options=options
                    name=name
                    horizontal=horizontal()
                    disabled=disabled
                />
            }
            .into_any(),
            "file" => view! {
                <FileUpload form=form index=index attrs=bag />
            }
            .into_any(),
            "template" => match (template, item.get_untracked()) {
                (Some(render), Some(descriptor)) => render.run(descriptor),
                _ => ().into_any(),
            },
            other => {
                log::warn!("Unsupported field type '{}'", other);
                ().into_any()
            }
        }
    };

    view! {
        <div class=container_class>
            <label class="form__label" for=move || dom_id.get().unwrap_or_default()>
                {label}
            </label>
            {widget}
            {move || error.get().map(|message| view! {
                <small class="form__error p-error">{message}</small>
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_mask() {
        assert_eq!(apply_mask("999 99 999 99", "0341234567"), "034 12 345 67");
        assert_eq!(apply_mask("99/99/9999", "1503"), "15/03");
        assert_eq!(apply_mask("99-99", "1a2-3"), "12-3");
        assert_eq!(apply_mask("aa-99", "MG42"), "MG-42");
    }

    #[test]
    fn test_is_mask_complete() {
        assert!(is_mask_complete("99-99", "12-34"));
        assert!(!is_mask_complete("99-99", "12-3"));
    }

    #[test]
    fn test_resolve_raw_keeps_option_types() {
        let extra = ExtraAttrs::Choice(contracts::dynamic_form::hydrate_attrs::ChoiceAttrs {
            alignment: None,
            options: vec![json!({ "value": 1, "label": "Un" }), json!({ "value": 2, "label": "Deux" })],
            invalid: false,
            select_label: None,
            select_value: None,
        });
        assert_eq!(resolve_raw(&extra, "2"), json!(2));
        assert_eq!(resolve_raw(&extra, ""), Value::Null);
        assert_eq!(resolve_raw(&extra, "9"), json!("9"));
        assert_eq!(option_rows(&extra)[0], ("1".to_string(), "Un".to_string()));
    }
}
