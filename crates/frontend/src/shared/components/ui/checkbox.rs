use leptos::prelude::*;

/// Checkbox component
#[component]
pub fn Checkbox(
    /// Label text
    #[prop(into)]
    label: Signal<String>,
    /// Checked state
    #[prop(into)]
    checked: Signal<bool>,
    /// Change event handler
    #[prop(optional)]
    on_change: Option<Callback<bool>>,
    /// Disabled state
    #[prop(optional, into)]
    disabled: MaybeProp<bool>,
    /// ID for the checkbox element
    #[prop(optional, into)]
    id: MaybeProp<String>,
    /// Additional CSS classes for wrapper
    #[prop(optional, into)]
    class: MaybeProp<String>,
) -> impl IntoView {
    let checkbox_id = move || id.get().unwrap_or_default();
    let additional_class = move || class.get().unwrap_or_default();
    let is_disabled = move || disabled.get().unwrap_or(false);
    let wrapper_class = move || {
        if is_disabled() {
            format!(
                "form__checkbox-wrapper form__checkbox-wrapper--disabled {}",
                additional_class()
            )
        } else {
            format!("form__checkbox-wrapper {}", additional_class())
        }
    };

    view! {
        <div class=wrapper_class>
            <input
                id=checkbox_id
                type="checkbox"
                class="form__checkbox"
                prop:checked=move || checked.get()
                disabled=is_disabled
                on:change=move |ev| {
                    if let Some(handler) = on_change {
                        handler.run(event_target_checked(&ev));
                    }
                }
            />
            <label class="form__checkbox-label" for=checkbox_id>
                {label}
            </label>
        </div>
    }
}

/// Group of checkboxes sharing one list of checked values
#[component]
pub fn CheckboxGroup(
    /// Label for the group
    #[prop(optional, into)]
    label: MaybeProp<String>,
    /// Checked option values
    #[prop(into)]
    checked: Signal<Vec<String>>,
    /// (option value, now checked)
    #[prop(optional)]
    on_toggle: Option<Callback<(String, bool)>>,
    /// Options: Vec of (value, label) tuples
    #[prop(into)]
    options: Signal<Vec<(String, String)>>,
    /// Prefix of the checkbox ids
    #[prop(into)]
    name: String,
    /// Lay the options out on one line
    #[prop(optional)]
    horizontal: bool,
    /// Disabled state
    #[prop(optional, into)]
    disabled: MaybeProp<bool>,
) -> impl IntoView {
    let group_class = if horizontal {
        "form__checkbox-group form__checkbox-group--horizontal"
    } else {
        "form__checkbox-group"
    };

    view! {
        <div class="form__group">
            {move || label.get().map(|l| view! {
                <label class="form__label">{l}</label>
            })}
            <div class=group_class>
                <For
                    each=move || options.get()
                    key=|(val, _)| val.clone()
                    children=move |(val, lbl)| {
                        let val_for_check = val.clone();
                        let val_for_toggle = val.clone();
                        let is_checked = Signal::derive(move || checked.with(|c| c.contains(&val_for_check)));
                        let toggle = move |now_checked: bool| {
                            if let Some(handler) = on_toggle {
                                handler.run((val_for_toggle.clone(), now_checked));
                            }
                        };
                        view! {
                            <Checkbox
                                label=lbl
                                checked=is_checked
                                on_change=Callback::new(toggle)
                                disabled=disabled
                                id=format!("{}-{}", name, val)
                            />
                        }
                    }
                />
            </div>
        </div>
    }
}
