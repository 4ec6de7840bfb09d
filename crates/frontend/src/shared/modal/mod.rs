use crate::shared::icons::icon;
use leptos::ev;
use leptos::prelude::*;
use uuid::Uuid;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

/// Modal dialog bound to a visibility signal
///
/// Escape and a click on the overlay close it unless `persistent` is set.
#[component]
pub fn Modal(
    /// Visibility of the modal
    show: RwSignal<bool>,
    /// Title of the modal
    #[prop(optional, into)]
    title: MaybeProp<String>,
    /// Called after the modal was closed by the user
    #[prop(optional)]
    on_close: Option<Callback<()>>,
    /// Ignore Escape and overlay clicks
    #[prop(optional)]
    persistent: bool,
    /// Optional action buttons (Save, Cancel, etc.) to display in header
    #[prop(optional)]
    action_buttons: Option<ChildrenFn>,
    /// Modal content
    children: ChildrenFn,
) -> impl IntoView {
    let title_id = format!("modal-title-{}", Uuid::new_v4());

    let close = move || {
        if show.get_untracked() {
            show.set(false);
            if let Some(handler) = on_close {
                handler.run(());
            }
        }
    };

    // Handle Escape key
    if !persistent {
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            if let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() {
                if keyboard_event.key() == "Escape" {
                    close();
                }
            }
        }) as Box<dyn FnMut(_)>);

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    // Handle overlay click
    let handle_overlay_click = move |_| {
        if !persistent {
            close();
        }
    };

    // Prevent click propagation from modal content
    let stop_propagation = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
    };

    view! {
        <Show when=move || show.get()>
            <div class="modal-overlay" on:click=handle_overlay_click>
                <div
                    class="modal"
                    role="dialog"
                    aria-modal="true"
                    aria-labelledby=title_id.clone()
                    on:click=stop_propagation
                >
                    <div class="modal-header">
                        <h2 class="modal-title" id=title_id.clone()>
                            {move || title.get().unwrap_or_default()}
                        </h2>
                        <div class="modal-header-actions">
                            {action_buttons.as_ref().map(|buttons| buttons())}
                            <button class="button button--icon modal__close" on:click=move |_| close()>
                                {icon("x")}
                            </button>
                        </div>
                    </div>
                    <div class="modal-body">
                        {children()}
                    </div>
                </div>
            </div>
        </Show>
    }
}
