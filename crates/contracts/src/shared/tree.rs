//! Helpers for nested option lists (`children` arrays of JSON objects)

use std::sync::Arc;

use serde_json::Value;

use crate::dynamic_form::types::Record;

/// Where `copy_keys` takes the value of a new key from
#[derive(Clone)]
pub enum KeySource {
    /// Existing key of the same object; skipped when absent
    Key(String),
    /// Computed from the object as copied so far
    Derive(Arc<dyn Fn(&Record) -> Value + Send + Sync>),
}

impl KeySource {
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }

    pub fn derive<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self::Derive(Arc::new(f))
    }
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(name) => f.debug_tuple("Key").field(name).finish(),
            Self::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

/// Keep the nodes matching `predicate` and the ancestors leading to them
///
/// A matching node keeps its children untouched. A non-matching node is kept
/// only if some descendant matches, with its children replaced by the
/// filtered list. Non-object entries are dropped unless they match.
pub fn filter_within_descendant<P>(items: &[Value], predicate: &P, children_key: &str) -> Vec<Value>
where
    P: Fn(&Value) -> bool,
{
    items
        .iter()
        .filter_map(|item| {
            if predicate(item) {
                return Some(item.clone());
            }
            let children = item.get(children_key)?.as_array()?;
            let kept = filter_within_descendant(children, predicate, children_key);
            if kept.is_empty() {
                return None;
            }
            let mut node = item.clone();
            if let Some(object) = node.as_object_mut() {
                object.insert(children_key.to_string(), Value::Array(kept));
            }
            Some(node)
        })
        .collect()
}

/// Add keys to every object, recursively through `children`
///
/// Mappings are applied in order, so a later mapping sees keys written by an
/// earlier one. The input is never modified.
pub fn copy_keys(items: &[Record], mappings: &[(String, KeySource)]) -> Vec<Record> {
    items
        .iter()
        .map(|item| {
            let mut copy = item.clone();
            for (new_key, source) in mappings {
                let value = match source {
                    KeySource::Key(key) => copy.get(key).cloned(),
                    KeySource::Derive(f) => Some(f(&copy)),
                };
                if let Some(value) = value {
                    copy.insert(new_key.clone(), value);
                }
            }
            let children: Option<Vec<Record>> = copy
                .get("children")
                .and_then(Value::as_array)
                .filter(|children| !children.is_empty())
                .map(|children| {
                    children
                        .iter()
                        .filter_map(|child| child.as_object().cloned())
                        .collect()
                });
            if let Some(children) = children {
                let copied = copy_keys(&children, mappings)
                    .into_iter()
                    .map(Value::Object)
                    .collect();
                copy.insert("children".to_string(), Value::Array(copied));
            }
            copy
        })
        .collect()
}

/// `true` when `value` is an object holding every key
pub fn has_keys(value: &Value, keys: &[&str]) -> bool {
    match value.as_object() {
        Some(object) => keys.iter().all(|key| object.contains_key(*key)),
        None => false,
    }
}

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_filter_within_descendant_keeps_ancestors() {
        let items = json!([
            { "label": "A", "children": [{ "label": "x" }, { "label": "y" }] },
            { "label": "B" }
        ]);
        let items = items.as_array().unwrap();
        let filtered = filter_within_descendant(items, &|o: &Value| o["label"] == "x", "children");
        assert_eq!(filtered, vec![json!({ "label": "A", "children": [{ "label": "x" }] })]);

        // исходные данные не изменены
        assert_eq!(items[0]["children"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_filter_within_descendant_matching_parent_keeps_children() {
        let items = json!([{ "label": "A", "children": [{ "label": "x" }, { "label": "y" }] }]);
        let filtered = filter_within_descendant(items.as_array().unwrap(), &|o: &Value| o["label"] == "A", "children");
        assert_eq!(filtered[0]["children"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_filter_within_descendant_custom_key() {
        let items = json!([
            { "name": "root", "items": [{ "name": "leaf", "items": [{ "name": "deep" }] }] },
            { "name": "other", "items": [] }
        ]);
        let filtered = filter_within_descendant(items.as_array().unwrap(), &|o: &Value| o["name"] == "deep", "items");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["items"][0]["items"][0]["name"], "deep");
    }

    #[test]
    fn test_copy_keys_existing_only() {
        let items = records(json!([
            { "id": 1, "name": "Antananarivo", "children": [{ "id": 2, "name": "Analamanga" }] },
            { "code": "X" }
        ]));
        let mappings = vec![
            ("value".to_string(), KeySource::key("id")),
            ("label".to_string(), KeySource::key("name")),
        ];
        let copied = copy_keys(&items, &mappings);

        assert_eq!(copied[0]["value"], json!(1));
        assert_eq!(copied[0]["label"], json!("Antananarivo"));
        assert_eq!(copied[0]["children"][0]["label"], json!("Analamanga"));
        assert!(!copied[1].contains_key("value"));
        assert!(!items[0].contains_key("value"));
    }

    #[test]
    fn test_copy_keys_derive() {
        let items = records(json!([{ "first": "Jean", "last": "Rabe" }]));
        let mappings = vec![(
            "full".to_string(),
            KeySource::derive(|o| json!(format!("{} {}", o["first"].as_str().unwrap_or(""), o["last"].as_str().unwrap_or("")))),
        )];
        let copied = copy_keys(&items, &mappings);
        assert_eq!(copied[0]["full"], json!("Jean Rabe"));
    }

    #[test]
    fn test_has_keys_and_is_array() {
        assert!(has_keys(&json!({ "path": "a", "name": "b" }), &["path", "name"]));
        assert!(!has_keys(&json!({ "path": "a" }), &["path", "name"]));
        assert!(!has_keys(&json!("path"), &["path"]));
        assert!(is_array(&json!([])));
        assert!(!is_array(&json!({})));
    }
}
