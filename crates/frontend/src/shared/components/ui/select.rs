use leptos::prelude::*;

/// Options whose label contains `query`, case-insensitive
pub fn filter_options(options: &[(String, String)], query: &str) -> Vec<(String, String)> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return options.to_vec();
    }
    options
        .iter()
        .filter(|(_, label)| label.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Select component with label support
#[component]
pub fn Select(
    /// Label text (optional)
    #[prop(optional, into)]
    label: MaybeProp<String>,
    /// Current value
    #[prop(into)]
    value: Signal<String>,
    /// Change event handler
    #[prop(optional)]
    on_change: Option<Callback<String>>,
    /// Options: Vec of (value, label) tuples
    #[prop(into)]
    options: Signal<Vec<(String, String)>>,
    /// Text of the empty first option
    #[prop(optional, into)]
    placeholder: MaybeProp<String>,
    /// Adds a search box above the list
    #[prop(optional)]
    filter: bool,
    /// Shown when the search matches nothing
    #[prop(optional, into)]
    empty_filter_message: MaybeProp<String>,
    /// Disabled state
    #[prop(optional, into)]
    disabled: MaybeProp<bool>,
    /// Marks the select as invalid
    #[prop(optional, into)]
    invalid: MaybeProp<bool>,
    /// ID for the select element
    #[prop(optional, into)]
    id: MaybeProp<String>,
    /// Additional CSS classes
    #[prop(optional, into)]
    class: MaybeProp<String>,
) -> impl IntoView {
    let select_id = move || id.get().unwrap_or_default();
    let additional_class = move || class.get().unwrap_or_default();
    let (query, set_query) = signal(String::new());
    let visible_options = Memo::new(move |_| options.with(|opts| filter_options(opts, &query.get())));

    view! {
        <div class="form__group">
            {move || label.get().map(|l| view! {
                <label class="form__label" for=select_id>
                    {l}
                </label>
            })}
            {filter.then(|| view! {
                <input
                    type="search"
                    class="form__input form__select-filter"
                    prop:value=move || query.get()
                    on:input=move |ev| set_query.set(event_target_value(&ev))
                />
            })}
            <select
                id=select_id
                class=move || {
                    let invalid_class = if invalid.get().unwrap_or(false) { "form__select--invalid" } else { "" };
                    format!("form__select {} {}", invalid_class, additional_class())
                }
                disabled=move || disabled.get().unwrap_or(false)
                on:change=move |ev| {
                    if let Some(handler) = on_change {
                        handler.run(event_target_value(&ev));
                    }
                }
            >
                <option value="" selected=move || value.get().is_empty()>
                    {move || placeholder.get().unwrap_or_default()}
                </option>
                <For
                    each=move || visible_options.get()
                    key=|(val, _)| val.clone()
                    children=move |(val, label)| {
                        let val_clone = val.clone();
                        let is_selected = move || value.get() == val_clone;
                        view! {
                            <option value=val selected=is_selected>
                                {label}
                            </option>
                        }
                    }
                />
            </select>
            {move || {
                let nothing_found = filter && !query.get().trim().is_empty() && visible_options.with(|o| o.is_empty());
                nothing_found.then(|| view! {
                    <small class="form__hint">{empty_filter_message.get().unwrap_or_default()}</small>
                })
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_options() {
        let options = vec![
            ("1".to_string(), "Antananarivo".to_string()),
            ("2".to_string(), "Toamasina".to_string()),
        ];
        assert_eq!(filter_options(&options, "").len(), 2);
        assert_eq!(filter_options(&options, " TOAM "), vec![options[1].clone()]);
        assert!(filter_options(&options, "Mahajanga").is_empty());
    }
}
