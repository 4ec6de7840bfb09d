use contracts::dynamic_form::{form_result, ErrorMap, FieldDescriptor, FormResult};
use leptos::prelude::*;

use super::field::DynamicField;
use super::use_pagination::use_form_pagination;
use super::use_rule_registry;
use crate::shared::components::ui::Button;
use crate::shared::components::FormStepper;
use crate::shared::config::use_library_config;
use crate::shared::icons::icon;

/// Position of the first field holding an error
pub fn first_invalid(form: &[FieldDescriptor], errors: &ErrorMap) -> Option<usize> {
    form.iter().position(|field| errors.contains_key(&field.id))
}

/// Renders a list of field descriptors as a form
///
/// Validation runs on submit with the rules from context; once submitted,
/// errors follow every change. A paginated form shows `limit` fields per
/// step and jumps to the step of the first invalid field.
#[component]
pub fn DynamicForm(
    /// Descriptors, edited in place by the widgets
    form: RwSignal<Vec<FieldDescriptor>>,
    /// Called with the extracted values once the form is valid
    on_submit: Callback<FormResult>,
    /// Prefix of the DOM ids
    #[prop(optional, into)]
    prefix: MaybeProp<String>,
    #[prop(optional)]
    paginated: bool,
    /// Fields per step when paginated
    #[prop(optional)]
    limit: Option<usize>,
    /// Query parameter holding the current step
    #[prop(optional)]
    query_key: Option<&'static str>,
    /// Disables the submit button and shows a spinner
    #[prop(optional, into)]
    loading: MaybeProp<bool>,
    #[prop(optional, into)]
    submit_label: MaybeProp<String>,
    /// Renders `template` fields
    #[prop(optional)]
    template: Option<Callback<FieldDescriptor, AnyView>>,
) -> impl IntoView {
    let registry = use_rule_registry();
    let errors = RwSignal::new(ErrorMap::new());
    let submitted = RwSignal::new(false);

    let len = Signal::derive(move || form.with(Vec::len));
    let pagination = use_form_pagination(len, paginated, limit, query_key);

    let live_registry = registry.clone();
    Effect::new(move |_| {
        if submitted.get() {
            let current = form.with(|fields| live_registry.validate_form(fields));
            errors.set(current);
        }
    });

    let handle_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        submitted.set(true);
        let current = form.with_untracked(|fields| registry.validate_form(fields));
        let invalid_at = form.with_untracked(|fields| first_invalid(fields, &current));
        errors.set(current);

        match invalid_at {
            Some(index) => {
                log::debug!("form invalid, first error at field {}", index);
                pagination.reveal(index);
            }
            None => on_submit.run(form.with_untracked(|fields| form_result(fields))),
        }
    };

    let prefix = move || prefix.get().unwrap_or_else(|| "form".to_string());
    let default_submit = use_library_config().form.submit_label.clone();
    let submit_text = move || submit_label.get().unwrap_or_else(|| default_submit.clone());
    let is_paginated = move || pagination.pagination.with(|p| p.is_paginated());
    let errors_signal = Signal::from(errors);

    view! {
        <form class="dynamic-form" novalidate=true on:submit=handle_submit>
            <Show when=is_paginated>
                <FormStepper
                    steps=Signal::derive(move || pagination.steps())
                    active=Signal::derive(move || pagination.active_step())
                    on_select=Callback::new(move |step: usize| pagination.go_to(step + 1))
                />
            </Show>
            <div class="dynamic-form__fields">
                <For
                    each=move || pagination.visible_indices()
                    key=|index| *index
                    children=move |index| view! {
                        <DynamicField
                            form=form
                            index=index
                            prefix=prefix()
                            errors=errors_signal
                            template=template
                        />
                    }
                />
            </div>
            <div class="dynamic-form__actions">
                <Show when=is_paginated>
                    <Button
                        variant="secondary"
                        disabled=Signal::derive(move || Some(!pagination.has_prev()))
                        on_click=Callback::new(move |_| pagination.prev())
                    >
                        {icon("chevron-left")}
                        "Précédent"
                    </Button>
                    <Button
                        variant="secondary"
                        disabled=Signal::derive(move || Some(!pagination.has_next()))
                        on_click=Callback::new(move |_| pagination.next())
                    >
                        "Suivant"
                        {icon("chevron-right")}
                    </Button>
                </Show>
                <Button button_type="submit" loading=loading>
                    {submit_text}
                </Button>
            </div>
        </form>
    }
}
