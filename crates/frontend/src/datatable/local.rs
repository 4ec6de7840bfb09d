//! Fetcher over rows already held in memory

use std::cmp::Ordering;
use std::sync::Arc;

use contracts::datatable::{PageRequest, PaginatedData};
use contracts::dynamic_form::value::{to_display_string, to_number};
use contracts::dynamic_form::{Fetcher, Record};
use serde_json::Value;

fn contains_ci(value: &Value, needle: &str) -> bool {
    to_display_string(value).to_lowercase().contains(needle)
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (to_number(a), to_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => to_display_string(a).cmp(&to_display_string(b)),
    }
}

/// Apply filter, search, sort and paging of `request` to `rows`
pub fn paginate_local(rows: &[Record], request: &PageRequest) -> PaginatedData<Record> {
    let search = request.search.as_deref().map(str::to_lowercase);
    let mut matching: Vec<Record> = rows
        .iter()
        .filter(|row| {
            request.filter.iter().flatten().all(|(key, wanted)| {
                row.get(key)
                    .map_or(false, |value| contains_ci(value, &wanted.to_lowercase()))
            })
        })
        .filter(|row| match &search {
            Some(needle) => row.values().any(|value| contains_ci(value, needle)),
            None => true,
        })
        .cloned()
        .collect();

    if let Some(sort) = request.sort.as_deref() {
        let (field, descending) = match sort.strip_prefix('-') {
            Some(field) => (field, true),
            None => (sort, false),
        };
        matching.sort_by(|a, b| {
            let ordering = compare(a.get(field), b.get(field));
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    let total = matching.len() as u64;
    let limit = request.limit.max(1);
    let last_page = total.div_ceil(limit).max(1);
    let current_page = request.page.clamp(1, last_page);
    let start = ((current_page - 1) * limit) as usize;
    let data: Vec<Record> = matching.into_iter().skip(start).take(limit as usize).collect();

    let mut page = PaginatedData::from_items(data);
    page.current_page = current_page;
    page.last_page = last_page;
    page.per_page = limit;
    page.total = total;
    page.from = if page.data.is_empty() { None } else { Some(start as u64 + 1) };
    page.to = page.from.map(|from| from + page.data.len() as u64 - 1);
    page
}

/// Fetcher answering from `rows`, for static tables and demos
pub fn local_fetcher(rows: Vec<Record>) -> Fetcher {
    let rows = Arc::new(rows);
    Fetcher::new(move |request: PageRequest| {
        let page = paginate_local(&rows, &request);
        async move { Ok(page) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn rows() -> Vec<Record> {
        json!([
            { "id": 1, "name": "Riz", "price": 3200, "status": "active" },
            { "id": 2, "name": "Sucre", "price": 4500, "status": "inactive" },
            { "id": 3, "name": "Huile", "price": 12000, "status": "active" },
            { "id": 4, "name": "Sel", "price": 800, "status": "active" },
        ])
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
    }

    fn ids(page: &PaginatedData<Record>) -> Vec<i64> {
        page.data.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[test]
    fn test_paging() {
        let page = paginate_local(&rows(), &PageRequest::new(2, 3));
        assert_eq!(ids(&page), vec![4]);
        assert_eq!(page.total, 4);
        assert_eq!(page.last_page, 2);
        assert!(page.is_last_page());
        assert_eq!((page.from, page.to), (Some(4), Some(4)));
    }

    #[test]
    fn test_numeric_sort_descending() {
        let mut request = PageRequest::new(1, 10);
        request.sort = Some("-price".to_string());
        assert_eq!(ids(&paginate_local(&rows(), &request)), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_filter_and_search() {
        let mut request = PageRequest::new(1, 10);
        request.filter = Some(BTreeMap::from([("status".to_string(), "active".to_string())]));
        // "inactive" тоже содержит "active"
        assert_eq!(paginate_local(&rows(), &request).total, 4);

        request.filter = Some(BTreeMap::from([("status".to_string(), "inactive".to_string())]));
        assert_eq!(ids(&paginate_local(&rows(), &request)), vec![2]);

        request.filter = None;
        request.search = Some("hUi".to_string());
        assert_eq!(ids(&paginate_local(&rows(), &request)), vec![3]);
    }

    #[test]
    fn test_empty_rows() {
        let page = paginate_local(&[], &PageRequest::new(5, 10));
        assert_eq!(page.current_page, 1);
        assert_eq!(page.last_page, 1);
        assert!(page.data.is_empty());
        assert_eq!(page.from, None);
    }
}
