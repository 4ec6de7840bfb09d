//! Синхронизация состояния с query-строкой адреса (`?page=2`)

use std::collections::BTreeMap;

use contracts::dynamic_form::page_from_query;
use leptos::prelude::*;
use web_sys::window;

fn current_search() -> String {
    window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Raw `key` part of one `key=value` pair
fn pair_key(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(key, _)| key)
}

/// Decoded value of `key` in a query string, with or without the leading `?`
pub fn query_value(search: &str, key: &str) -> Option<String> {
    let pair = search
        .trim_start_matches('?')
        .split('&')
        .find(|pair| pair_key(pair) == key)?;
    serde_qs::from_str::<BTreeMap<String, String>>(pair)
        .ok()
        .and_then(|mut decoded| decoded.remove(key))
}

/// Query string with `key` replaced in place (or dropped, with `None`)
///
/// Other pairs are kept verbatim, nested (`filter[status]=`) and repeated
/// keys included. A new key goes last.
pub fn with_query_value(search: &str, key: &str, value: Option<&str>) -> String {
    let encoded = value.map(|value| serde_qs::to_string(&BTreeMap::from([(key, value)])).unwrap_or_default());
    let mut pairs: Vec<String> = Vec::new();
    let mut replaced = false;

    for pair in search.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
        if pair_key(pair) != key {
            pairs.push(pair.to_string());
        } else if let (Some(encoded), false) = (&encoded, replaced) {
            pairs.push(encoded.clone());
            replaced = true;
        }
    }
    if let (Some(encoded), false) = (encoded, replaced) {
        pairs.push(encoded);
    }
    pairs.join("&")
}

/// Value of one query parameter of the current location
pub fn read_query_param(key: &str) -> Option<String> {
    query_value(&current_search(), key)
}

/// Replace (or drop, with `None`) one parameter without adding a history entry
pub fn write_query_param(key: &str, value: Option<String>) {
    let search = current_search();
    let query_string = with_query_value(&search, key, value.as_deref());
    let new_url = if query_string.is_empty() {
        window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default()
    } else {
        format!("?{}", query_string)
    };

    // URL меняем только если он действительно изменился
    if search != new_url {
        if let Some(w) = window() {
            if let Ok(history) = w.history() {
                let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&new_url));
            }
        }
    }
}

/// Whether the page cursor must be written back to the address
///
/// The first run only writes when the parameter was already there.
fn should_write_page(previous: Option<usize>, current: usize, present: bool) -> bool {
    match previous {
        None => present,
        Some(previous) => previous != current,
    }
}

/// Page cursor stored in the `key` query parameter, 1 when absent or invalid
pub fn use_query_page(key: &'static str) -> RwSignal<usize> {
    let raw = read_query_param(key);
    let present = raw.is_some();
    let page = RwSignal::new(page_from_query(raw.as_deref()));

    Effect::new(move |previous: Option<usize>| {
        let current = page.get();
        if should_write_page(previous, current, present) {
            write_query_param(key, Some(current.to_string()));
        }
        current
    });

    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_value_keeps_nested_and_repeated_keys() {
        assert_eq!(
            with_query_value("?filter[status]=active&page=2", "page", Some("3")),
            "filter[status]=active&page=3"
        );
        assert_eq!(with_query_value("tag=a&tag=b&page=2", "page", Some("3")), "tag=a&tag=b&page=3");
        assert_eq!(with_query_value("?q=a", "page", Some("1")), "q=a&page=1");
        assert_eq!(with_query_value("?page=2&q=a", "page", None), "q=a");
        assert_eq!(with_query_value("", "page", None), "");
    }

    #[test]
    fn test_query_value() {
        assert_eq!(query_value("?filter[status]=active&page=4", "page"), Some("4".to_string()));
        assert_eq!(query_value("?q=caf%C3%A9", "q"), Some("café".to_string()));
        assert_eq!(query_value("?pages=4", "page"), None);
        assert_eq!(query_value("", "page"), None);
    }

    #[test]
    fn test_should_write_page() {
        // параметра нет: первый запуск ничего не пишет
        assert!(!should_write_page(None, 1, false));
        assert!(should_write_page(None, 2, true));
        assert!(should_write_page(Some(1), 2, false));
        assert!(!should_write_page(Some(2), 2, true));
    }
}
