//! Copying backend values into form fields and reading them back
//!
//! Unknown field ids are skipped silently: a backend record usually carries
//! more columns than the form edits.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::types::{FieldDescriptor, FieldKind, FileEntry, FormResult};
use super::value::{number_value, to_display_string, to_number};
use crate::error::FormError;

impl FieldDescriptor {
    /// Current value as JSON
    pub fn value(&self) -> Value {
        match &self.kind {
            FieldKind::Input(f) | FieldKind::Textarea(f) | FieldKind::Date(f) | FieldKind::Password(f) => {
                Value::String(f.value.clone())
            }
            FieldKind::Mask(f) => Value::String(f.value.clone()),
            FieldKind::Number(f) => f.value.map(number_value).unwrap_or(Value::Null),
            FieldKind::Select(f) => f.value.clone(),
            FieldKind::TreeSelect(f) => f.value.clone(),
            FieldKind::LazySelect(f) => f.value.clone(),
            FieldKind::Radio(f) => f.value.clone(),
            FieldKind::Template(f) => f.value.clone(),
            FieldKind::MultiSelect(f) => Value::Array(f.value.clone()),
            FieldKind::Checkbox(f) => Value::Array(f.value.clone()),
            FieldKind::File(f) => serde_json::to_value(&f.value).unwrap_or_default(),
        }
    }

    /// Assign a raw value, converting it to the variant's value type
    ///
    /// Number fields use `Number()` coercion, so `"42"` becomes `42` and
    /// non-numeric input leaves the field empty.
    pub fn set_value(&mut self, raw: Value) -> Result<(), FormError> {
        let id = self.id.clone();
        match &mut self.kind {
            FieldKind::Input(f) | FieldKind::Textarea(f) | FieldKind::Password(f) => {
                f.value = text_value(&id, raw)?;
            }
            FieldKind::Date(f) => {
                f.value = normalize_date(&text_value(&id, raw)?);
            }
            FieldKind::Mask(f) => {
                f.value = text_value(&id, raw)?;
            }
            FieldKind::Number(f) => {
                f.value = to_number(&raw);
                if f.value.is_none() {
                    log::debug!("Field '{}' received a non-numeric value: {}", id, raw);
                }
            }
            FieldKind::Select(f) => f.value = raw,
            FieldKind::TreeSelect(f) => f.value = raw,
            FieldKind::LazySelect(f) => f.value = raw,
            FieldKind::Radio(f) => f.value = raw,
            FieldKind::Template(f) => f.value = raw,
            FieldKind::MultiSelect(f) => f.value = list_value(raw),
            FieldKind::Checkbox(f) => f.value = list_value(raw),
            FieldKind::File(f) => {
                let raw = match raw {
                    Value::Null => Value::Array(Vec::new()),
                    Value::Object(record) => Value::Array(vec![Value::Object(record)]),
                    other => other,
                };
                f.value = serde_json::from_value::<Vec<FileEntry>>(raw)
                    .map_err(|e| FormError::conversion(&id, e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Assign text typed into a widget; an emptied number input clears the field
    pub fn set_input(&mut self, raw: &str) -> Result<(), FormError> {
        if let FieldKind::Number(f) = &mut self.kind {
            if raw.trim().is_empty() {
                f.value = None;
                return Ok(());
            }
        }
        self.set_value(Value::String(raw.to_string()))
    }

    /// Any attribute by its JSON name (`"value"`, `"label"`, `"selectOption"`...)
    pub fn attribute(&self, key: &str) -> Option<Value> {
        if key == "value" {
            return Some(self.value());
        }
        let json = serde_json::to_value(self).ok()?;
        json.get(key).cloned()
    }
}

fn text_value(field_id: &str, raw: Value) -> Result<String, FormError> {
    match raw {
        Value::String(s) => Ok(s),
        Value::Array(_) | Value::Object(_) => Err(FormError::conversion(
            field_id,
            "expected a scalar value for a text field",
        )),
        scalar => Ok(to_display_string(&scalar)),
    }
}

fn list_value(raw: Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}

/// Date inputs expect `YYYY-MM-DD`; backends often send full timestamps
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

/// Set the value of the first field with `field_id`; unknown ids are ignored
pub fn fill_form_value(form: &mut [FieldDescriptor], field_id: &str, filler: Value) {
    let Some(field) = form.iter_mut().find(|f| f.id == field_id) else {
        return;
    };
    if let Err(err) = field.set_value(filler) {
        log::warn!("Prefill skipped: {}", err);
    }
}

/// Copy every key of a backend object into the matching fields
pub fn prefill_form(form: &mut [FieldDescriptor], form_back: Option<&Value>) {
    let Some(Value::Object(record)) = form_back else {
        return;
    };
    for (key, value) in record {
        fill_form_value(form, key, value.clone());
    }
}

pub fn get_one_value_from_key(form: &[FieldDescriptor], field_id: &str, field_key: &str) -> Option<Value> {
    form.iter()
        .find(|f| f.id == field_id)
        .and_then(|f| f.attribute(field_key))
}

pub fn get_one_form_value(form: &[FieldDescriptor], field_id: &str) -> Option<Value> {
    get_one_value_from_key(form, field_id, "value")
}

/// Field id -> value, ready to be sent to the backend
pub fn form_result(form: &[FieldDescriptor]) -> FormResult {
    form.iter()
        .filter(|f| !matches!(f.kind, FieldKind::Template(_)) || !f.value().is_null())
        .map(|f| (f.id.clone(), f.value()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_form::types::{CheckboxField, FileField, NumberField, TemplateField, TextField};
    use serde_json::json;

    fn sample_form() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("age", "Age", FieldKind::Number(NumberField { value: Some(0.0), ..NumberField::default() })),
            FieldDescriptor::new("name", "Nom", FieldKind::input()),
            FieldDescriptor::new("birth", "Naissance", FieldKind::Date(TextField::default())),
            FieldDescriptor::new("tags", "Tags", FieldKind::Checkbox(CheckboxField::default())),
        ]
    }

    #[test]
    fn test_prefill_coerces_numbers() {
        let mut form = sample_form();
        prefill_form(&mut form, Some(&json!({ "age": "42" })));
        assert_eq!(get_one_form_value(&form, "age"), Some(json!(42.0)));
        match &form[0].kind {
            FieldKind::Number(n) => assert_eq!(n.value, Some(42.0)),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_prefill_assigns_other_types() {
        let mut form = sample_form();
        prefill_form(
            &mut form,
            Some(&json!({
                "name": "Rakoto",
                "birth": "1990-05-17T00:00:00Z",
                "tags": ["a", "b"],
                "unknown": 1
            })),
        );
        assert_eq!(get_one_form_value(&form, "name"), Some(json!("Rakoto")));
        assert_eq!(get_one_form_value(&form, "birth"), Some(json!("1990-05-17")));
        assert_eq!(get_one_form_value(&form, "tags"), Some(json!(["a", "b"])));
    }

    #[test]
    fn test_prefill_ignores_non_objects() {
        let mut form = sample_form();
        let before = form.clone();
        prefill_form(&mut form, None);
        prefill_form(&mut form, Some(&json!([1, 2])));
        prefill_form(&mut form, Some(&json!("age")));
        assert_eq!(form, before);
    }

    #[test]
    fn test_non_numeric_value_empties_number_field() {
        let mut form = sample_form();
        fill_form_value(&mut form, "age", json!("douze"));
        assert_eq!(get_one_form_value(&form, "age"), Some(Value::Null));
    }

    #[test]
    fn test_conversion_failure_keeps_previous_value() {
        let mut form = sample_form();
        fill_form_value(&mut form, "name", json!("Rabe"));
        fill_form_value(&mut form, "name", json!({ "nested": true }));
        assert_eq!(get_one_form_value(&form, "name"), Some(json!("Rabe")));
    }

    #[test]
    fn test_file_values_from_backend() {
        let mut form = vec![FieldDescriptor::new("photo", "Photo", FieldKind::File(FileField::default()))];
        fill_form_value(
            &mut form,
            "photo",
            json!({ "path": "tmp/abc.jpg", "name": "abc.jpg" }),
        );
        match &form[0].kind {
            FieldKind::File(f) => {
                assert_eq!(f.value.len(), 1);
                assert_eq!(f.value[0].name(), "abc.jpg");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_set_input_clears_number() {
        let mut form = sample_form();
        form[0].set_input("12.5").unwrap();
        assert_eq!(form[0].value(), json!(12.5));
        form[0].set_input("  ").unwrap();
        assert_eq!(form[0].value(), Value::Null);
        form[1].set_input("").unwrap();
        assert_eq!(form[1].value(), json!(""));
    }

    #[test]
    fn test_get_one_value_from_key() {
        let form = sample_form();
        assert_eq!(get_one_value_from_key(&form, "name", "label"), Some(json!("Nom")));
        assert_eq!(get_one_value_from_key(&form, "name", "type"), Some(json!("input")));
        assert_eq!(get_one_value_from_key(&form, "missing", "value"), None);
        assert_eq!(get_one_value_from_key(&form, "name", "nope"), None);
    }

    #[test]
    fn test_form_result() {
        let mut form = sample_form();
        form.push(FieldDescriptor::new("slot", "Slot", FieldKind::Template(TemplateField::default())));
        fill_form_value(&mut form, "name", json!("Rasoa"));
        let result = form_result(&form);
        assert_eq!(result["name"], json!("Rasoa"));
        assert_eq!(result["age"], json!(0.0));
        assert!(!result.contains_key("slot"));
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-03-15 14:02:26"), "2024-03-15");
        assert_eq!(normalize_date("2024-03-15"), "2024-03-15");
        assert_eq!(normalize_date("15/03/2024"), "15/03/2024");
    }
}
