use crate::shared::icons::icon;
use leptos::prelude::*;

/// Input component with label support
#[component]
pub fn Input(
    /// Label text (optional)
    #[prop(optional, into)]
    label: MaybeProp<String>,
    /// Input value
    #[prop(into)]
    value: Signal<String>,
    /// Input event handler
    #[prop(optional)]
    on_input: Option<Callback<String>>,
    /// Called with the value when the input loses focus
    #[prop(optional)]
    on_blur: Option<Callback<String>>,
    /// Placeholder text
    #[prop(optional, into)]
    placeholder: MaybeProp<String>,
    /// Input type: "text" (default), "password", "number", "date", etc.
    #[prop(optional, into)]
    input_type: MaybeProp<String>,
    /// Show/hide button for password inputs
    #[prop(optional)]
    toggle_mask: bool,
    /// Text rendered before the input (currency, unit)
    #[prop(optional, into)]
    prefix: MaybeProp<String>,
    /// Text rendered after the input
    #[prop(optional, into)]
    suffix: MaybeProp<String>,
    /// Disabled state
    #[prop(optional, into)]
    disabled: MaybeProp<bool>,
    /// Required attribute
    #[prop(optional)]
    required: bool,
    /// Marks the input as invalid
    #[prop(optional, into)]
    invalid: MaybeProp<bool>,
    /// ID for the input element
    #[prop(optional, into)]
    id: MaybeProp<String>,
    /// Autocomplete attribute
    #[prop(optional, into)]
    autocomplete: MaybeProp<String>,
    /// Additional CSS classes
    #[prop(optional, into)]
    class: MaybeProp<String>,
) -> impl IntoView {
    let input_id = move || id.get().unwrap_or_default();
    let input_placeholder = move || placeholder.get().unwrap_or_default();
    let input_autocomplete = move || autocomplete.get().unwrap_or_default();
    let additional_class = move || class.get().unwrap_or_default();
    let is_invalid = move || invalid.get().unwrap_or(false);
    let (masked, set_masked) = signal(true);

    let input_t = move || {
        let t = input_type.get().unwrap_or_else(|| "text".to_string());
        if t == "password" && toggle_mask && !masked.get() {
            "text".to_string()
        } else {
            t
        }
    };

    view! {
        <div class="form__group">
            {move || label.get().map(|l| view! {
                <label class="form__label" for=input_id>
                    {l}
                </label>
            })}
            <div class="form__input-wrapper">
                {move || prefix.get().map(|p| view! { <span class="form__input-addon">{p}</span> })}
                <input
                    id=input_id
                    class=move || {
                        let invalid_class = if is_invalid() { "form__input--invalid" } else { "" };
                        format!("form__input {} {}", invalid_class, additional_class())
                    }
                    type=input_t
                    prop:value=move || value.get()
                    placeholder=input_placeholder
                    disabled=move || disabled.get().unwrap_or(false)
                    required=required
                    autocomplete=input_autocomplete
                    aria-invalid=move || is_invalid().to_string()
                    on:input=move |ev| {
                        if let Some(handler) = on_input {
                            handler.run(event_target_value(&ev));
                        }
                    }
                    on:blur=move |ev| {
                        if let Some(handler) = on_blur {
                            handler.run(event_target_value(&ev));
                        }
                    }
                />
                {move || suffix.get().map(|s| view! { <span class="form__input-addon">{s}</span> })}
                {toggle_mask.then(|| view! {
                    <button
                        type="button"
                        class="button button--icon form__input-toggle"
                        title=move || if masked.get() { "Afficher" } else { "Masquer" }
                        on:click=move |_| set_masked.update(|m| *m = !*m)
                    >
                        {move || if masked.get() { icon("eye") } else { icon("eye-off") }}
                    </button>
                })}
            </div>
        </div>
    }
}
