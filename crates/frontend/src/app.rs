//! Demo page mounted by `hydrate()`

use std::sync::Arc;

use contracts::config::LibraryConfig;
use contracts::datatable::{
    filter_status, filter_string, DatatableHeader, DatatableSelectEvent, SelectEventType, Transformer,
};
use contracts::dynamic_form::value::{format_number, to_number};
use contracts::dynamic_form::{
    prefill_form, FieldDescriptor, FieldKind, FormResult, OneFetcher, Record, RuleRegistry,
};
use contracts::error::FetchError;
use leptos::prelude::*;
use serde_json::{json, Value};

use crate::datatable::{local_fetcher, Datatable};
use crate::dynamic_form::{provide_rule_registry, DynamicForm};
use crate::shared::config::provide_library_config;
use crate::shared::modal::Modal;

fn records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(|v| v.as_object().cloned()).collect(),
        _ => Vec::new(),
    }
}

fn cities() -> Vec<Record> {
    records(json!([
        { "id": 1, "name": "Antananarivo" },
        { "id": 2, "name": "Toamasina" },
        { "id": 3, "name": "Mahajanga" },
        { "id": 4, "name": "Fianarantsoa" },
        { "id": 5, "name": "Toliara" },
        { "id": 6, "name": "Antsiranana" },
        { "id": 7, "name": "Antsirabe" },
        { "id": 8, "name": "Morondava" },
        { "id": 9, "name": "Manakara" },
        { "id": 10, "name": "Ambositra" },
        { "id": 11, "name": "Sambava" },
        { "id": 12, "name": "Nosy Be" },
    ]))
}

fn products() -> Vec<Record> {
    records(json!([
        { "id": 1, "name": "Riz", "price": 3200, "status": "available" },
        { "id": 2, "name": "Sucre", "price": 4500, "status": "sold_out" },
        { "id": 3, "name": "Huile", "price": 12000, "status": "available" },
        { "id": 4, "name": "Sel", "price": 800, "status": "available" },
        { "id": 5, "name": "Farine", "price": 3800, "status": "available" },
        { "id": 6, "name": "Café", "price": 9000, "status": "sold_out" },
        { "id": 7, "name": "Thé", "price": 2500, "status": "available" },
        { "id": 8, "name": "Lait", "price": 5200, "status": "available" },
        { "id": 9, "name": "Savon", "price": 1500, "status": "available" },
        { "id": 10, "name": "Bougie", "price": 700, "status": "sold_out" },
        { "id": 11, "name": "Pâtes", "price": 2800, "status": "available" },
    ]))
}

/// Descriptors of the demo form, as a backend would serve them
fn demo_fields() -> Vec<FieldDescriptor> {
    let definition = json!([
        { "id": "name", "label": "Nom", "type": "input", "validation": "required|min:3" },
        { "id": "email", "label": "Email", "type": "input", "validation": "required|email" },
        { "id": "phone", "label": "Téléphone", "type": "mask", "mask": "999 99 999 99", "validation": "required|phone_mg" },
        { "id": "age", "label": "Age", "type": "number", "suffix": " ans", "validation": "required|min_value:18" },
        { "id": "birthday", "label": "Date de naissance", "type": "date" },
        { "id": "city", "label": "Ville", "type": "lazyselect", "selectValue": "id", "selectLabel": "name", "validation": "required" },
        {
            "id": "category", "label": "Catégorie", "type": "select", "filter": true,
            "selectOption": [{ "value": 1, "label": "Alimentation" }, { "value": 2, "label": "Hygiène" }]
        },
        {
            "id": "tags", "label": "Etiquettes", "type": "multiselect", "filter": true,
            "selectOption": ["bio", "local", "import"], "validation": "not_empty_array"
        },
        {
            "id": "delivery", "label": "Livraison", "type": "radio", "alignement": "horizontal",
            "selectOption": [{ "value": "home", "label": "A domicile" }, { "value": "shop", "label": "En magasin" }]
        },
        { "id": "password", "label": "Mot de passe", "type": "password", "validation": "required|min:8" },
        { "id": "password_confirm", "label": "Confirmation", "type": "password", "validation": "required|confirmed:@password,Mot de passe" },
        { "id": "photos", "label": "Photos", "type": "file", "fileType": "image", "allowMultiple": true, "fileLimit": 3, "valueType": "formData" },
        { "id": "note", "label": "Remarque", "type": "textarea", "validation": "max:200" },
        { "id": "summary", "label": "Résumé", "type": "template" }
    ]);

    let mut fields: Vec<FieldDescriptor> = match serde_json::from_value(definition) {
        Ok(fields) => fields,
        Err(err) => {
            log::error!("demo form definition is invalid: {}", err);
            return Vec::new();
        }
    };

    for field in fields.iter_mut() {
        if let FieldKind::LazySelect(select) = &mut field.kind {
            select.fetcher = Some(local_fetcher(cities()));
            select.one_fetcher = Some(OneFetcher::new(|id: Value| async move {
                cities()
                    .into_iter()
                    .find(|city| city.get("id") == Some(&id))
                    .ok_or_else(|| FetchError::new("Ville introuvable"))
            }));
        }
    }

    prefill_form(&mut fields, Some(&json!({ "city": 4, "delivery": "home" })));
    fields
}

fn demo_rules(config: &LibraryConfig) -> RuleRegistry {
    let mut registry = RuleRegistry::with_config(config);
    registry.define_rule(
        "phone_mg",
        Arc::new(|value: &Value, _args: &[String]| {
            let digits: String = value.as_str().unwrap_or_default().chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() || (digits.len() == 10 && digits.starts_with("03")) {
                Ok(())
            } else {
                Err("Numéro invalide".to_string())
            }
        }),
    );
    registry
}

fn product_headers() -> Vec<DatatableHeader> {
    let price = Transformer::new(|value: &Value| match to_number(value) {
        Some(n) => Value::String(format!("{} Ar", format_number(n))),
        None => Value::Null,
    });
    vec![
        DatatableHeader::new("id", "#").numeric(),
        DatatableHeader::new("name", "Produit").sortable().with_filter(filter_string()),
        DatatableHeader::new("price", "Prix").sortable().numeric().with_transformer(price),
        DatatableHeader::new("status", "Statut").with_filter(filter_status(vec![
            json!({ "value": "available", "label": "Disponible" }),
            json!({ "value": "sold_out", "label": "Epuisé" }),
        ])),
    ]
}

#[component]
pub fn App() -> impl IntoView {
    let config = LibraryConfig::embedded().clone();
    provide_rule_registry(demo_rules(&config));
    provide_library_config(config);

    let form = RwSignal::new(demo_fields());
    let show_result = RwSignal::new(false);
    let (result, set_result) = signal(String::new());
    let (selected, set_selected) = signal(0usize);

    let on_submit = Callback::new(move |values: FormResult| {
        let pretty = serde_json::to_string_pretty(&values).unwrap_or_default();
        log::info!("form submitted with {} values", values.len());
        set_result.set(pretty);
        show_result.set(true);
    });

    let summary = Callback::new(move |_field: FieldDescriptor| {
        view! {
            <p class="form__hint">
                {move || format!("{} champs", form.with(Vec::len))}
            </p>
        }
        .into_any()
    });

    view! {
        <main class="demo">
            <section>
                <h1>"Formulaire"</h1>
                <DynamicForm
                    form=form
                    on_submit=on_submit
                    prefix="demo"
                    paginated=true
                    limit=4
                    query_key="page"
                    template=summary
                />
            </section>
            <section>
                <h1>"Produits"</h1>
                <p>{move || format!("{} sélectionné(s)", selected.get())}</p>
                <Datatable
                    headers=product_headers()
                    fetcher=local_fetcher(products())
                    limit=5
                    row_key="id"
                    searchable=true
                    on_select=Callback::new(move |event: DatatableSelectEvent| {
                        set_selected.update(|count| match event.kind {
                            SelectEventType::SelectRow => *count += 1,
                            SelectEventType::UnSelectRow => *count = count.saturating_sub(1),
                            SelectEventType::SelectAll => *count = event.data.len(),
                            SelectEventType::UnSelectAll => *count = 0,
                        });
                    })
                />
            </section>
            <Modal show=show_result title="Valeurs envoyées">
                <pre>{move || result.get()}</pre>
            </Modal>
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_fields_parse_and_prefill() {
        let fields = demo_fields();
        assert_eq!(fields.len(), 14);
        let city = fields.iter().find(|f| f.id == "city").unwrap();
        assert_eq!(city.value(), json!(4));
    }

    #[test]
    fn test_phone_rule() {
        let rules = demo_rules(LibraryConfig::embedded());
        assert!(rules.validate("phone_mg", &json!("034 12 345 67"), &[]).is_ok());
        assert!(rules.validate("phone_mg", &json!("12 34"), &[]).is_err());
    }
}
