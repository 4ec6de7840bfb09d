use contracts::dynamic_form::Step;
use leptos::prelude::*;

/// Steps of a paginated form; past steps are marked done
#[component]
pub fn FormStepper(
    /// Steps in order
    #[prop(into)]
    steps: Signal<Vec<Step>>,
    /// Zero-based index of the active step
    #[prop(into)]
    active: Signal<usize>,
    /// Called with the zero-based index of a clicked step
    #[prop(optional)]
    on_select: Option<Callback<usize>>,
) -> impl IntoView {
    view! {
        <ol class="stepper">
            {move || {
                let current = active.get();
                steps
                    .get()
                    .into_iter()
                    .enumerate()
                    .map(|(index, step)| {
                        let state_class = if index == current {
                            "stepper__item stepper__item--active"
                        } else if index < current {
                            "stepper__item stepper__item--done"
                        } else {
                            "stepper__item"
                        };
                        view! {
                            <li class=state_class>
                                <button
                                    type="button"
                                    class="stepper__button"
                                    aria-current=(index == current).then_some("step")
                                    on:click=move |_| {
                                        if let Some(handler) = on_select {
                                            handler.run(index);
                                        }
                                    }
                                >
                                    <span class="stepper__number">{index + 1}</span>
                                    <span class="stepper__label">{step.label}</span>
                                </button>
                            </li>
                        }
                    })
                    .collect_view()
            }}
        </ol>
    }
}
