use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dynamic_form::value::to_display_string;
use crate::dynamic_form::{FieldKind, Record};

/// Maps a raw cell value to the value shown in the table
#[derive(Clone)]
pub struct Transformer(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl Transformer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, value: &Value) -> Value {
        (self.0)(value)
    }
}

impl PartialEq for Transformer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transformer(..)")
    }
}

/// Column definition of a datatable
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatatableHeader {
    pub label: String,
    /// Key of the column in row records
    pub id: String,
    #[serde(default)]
    pub sortable: bool,
    /// Field rendered in the filter row; only its variant and options matter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FieldKind>,
    #[serde(default)]
    pub numeric: bool,
    #[serde(default)]
    pub no_wrap_header: bool,
    #[serde(skip)]
    pub transformer: Option<Transformer>,
}

impl DatatableHeader {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            sortable: false,
            filter: None,
            numeric: false,
            no_wrap_header: false,
            transformer: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn with_filter(mut self, filter: FieldKind) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Text of this column's cell for a row
    pub fn display(&self, row: &Record) -> String {
        let raw = row.get(&self.id).cloned().unwrap_or(Value::Null);
        match &self.transformer {
            Some(transformer) => to_display_string(&transformer.apply(&raw)),
            None => to_display_string(&raw),
        }
    }
}

/// Pagination link of a Laravel paginator
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaginatedLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Laravel `LengthAwarePaginator` response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaginatedData<T> {
    pub current_page: u64,
    #[serde(default)]
    pub first_page_url: String,
    #[serde(default)]
    pub from: Option<u64>,
    pub last_page: u64,
    #[serde(default)]
    pub last_page_url: String,
    #[serde(default)]
    pub links: Vec<PaginatedLink>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub path: String,
    pub per_page: u64,
    #[serde(default)]
    pub prev_page_url: Option<String>,
    #[serde(default)]
    pub to: Option<u64>,
    pub total: u64,
    pub data: Vec<T>,
}

impl<T> PaginatedData<T> {
    pub fn total_pages(&self) -> u64 {
        self.last_page
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.last_page
    }

    /// Single-page response holding `data`
    pub fn from_items(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self {
            current_page: 1,
            first_page_url: String::new(),
            from: if total > 0 { Some(1) } else { None },
            last_page: 1,
            last_page_url: String::new(),
            links: Vec::new(),
            next_page_url: None,
            path: String::new(),
            per_page: total.max(1),
            prev_page_url: None,
            to: if total > 0 { Some(total) } else { None },
            total,
            data,
        }
    }
}

/// Query sent to paginated endpoints (`?page=1&limit=10&sort=-name`)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PageRequest {
    /// 1-based
    pub page: u64,
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    /// Build a request from the table state, whose page index is 0-based
    pub fn from_table_state(
        page_index: usize,
        limit: usize,
        sort: Option<&SortState>,
        filter: &BTreeMap<String, String>,
        search: &str,
    ) -> Self {
        let filter: BTreeMap<String, String> = filter
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            page: page_index as u64 + 1,
            limit: limit as u64,
            sort: sort.map(SortState::to_param),
            filter: if filter.is_empty() { None } else { Some(filter) },
            search: if search.trim().is_empty() {
                None
            } else {
                Some(search.trim().to_string())
            },
        }
    }
}

/// Sorted column; serialized as `field` or `-field`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortState {
    pub field: String,
    pub ascending: bool,
}

impl SortState {
    /// Clicking the sorted column flips the direction, another column starts ascending
    pub fn toggle(current: Option<&SortState>, field: &str) -> SortState {
        match current {
            Some(sort) if sort.field == field => SortState {
                field: field.to_string(),
                ascending: !sort.ascending,
            },
            _ => SortState {
                field: field.to_string(),
                ascending: true,
            },
        }
    }

    pub fn to_param(&self) -> String {
        if self.ascending {
            self.field.clone()
        } else {
            format!("-{}", self.field)
        }
    }

    pub fn indicator(current: Option<&SortState>, field: &str) -> &'static str {
        match current {
            Some(sort) if sort.field == field => {
                if sort.ascending {
                    " ▲"
                } else {
                    " ▼"
                }
            }
            _ => " ⇅",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SelectEventType {
    SelectRow,
    SelectAll,
    UnSelectRow,
    UnSelectAll,
}

/// Emitted when the row selection of a datatable changes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DatatableSelectEvent {
    #[serde(rename = "type")]
    pub kind: SelectEventType,
    pub data: Vec<Record>,
}

/// Selected row keys of a datatable
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    key: String,
    selected: BTreeSet<String>,
}

impl Selection {
    /// `key` is the record field identifying a row
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            selected: BTreeSet::new(),
        }
    }

    pub fn row_key(&self, row: &Record) -> String {
        row.get(&self.key).map(to_display_string).unwrap_or_default()
    }

    pub fn is_selected(&self, row: &Record) -> bool {
        self.selected.contains(&self.row_key(row))
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn apply(&mut self, event: &DatatableSelectEvent) {
        match event.kind {
            SelectEventType::SelectRow | SelectEventType::SelectAll => {
                for row in &event.data {
                    let key = self.row_key(row);
                    self.selected.insert(key);
                }
            }
            SelectEventType::UnSelectRow => {
                for row in &event.data {
                    let key = self.row_key(row);
                    self.selected.remove(&key);
                }
            }
            SelectEventType::UnSelectAll => self.selected.clear(),
        }
    }

    /// Event for a row checkbox change
    pub fn row_event(row: &Record, checked: bool) -> DatatableSelectEvent {
        DatatableSelectEvent {
            kind: if checked {
                SelectEventType::SelectRow
            } else {
                SelectEventType::UnSelectRow
            },
            data: vec![row.clone()],
        }
    }

    /// Event for the header checkbox change
    pub fn all_event(rows: &[Record], checked: bool) -> DatatableSelectEvent {
        DatatableSelectEvent {
            kind: if checked {
                SelectEventType::SelectAll
            } else {
                SelectEventType::UnSelectAll
            },
            data: if checked { rows.to_vec() } else { Vec::new() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_paginated_data_from_laravel() {
        let page: PaginatedData<Record> = serde_json::from_value(json!({
            "current_page": 2,
            "first_page_url": "/api/products?page=1",
            "from": 11,
            "last_page": 3,
            "last_page_url": "/api/products?page=3",
            "links": [{ "url": null, "label": "&laquo; Previous", "active": false }],
            "next_page_url": "/api/products?page=3",
            "path": "/api/products",
            "per_page": 10,
            "prev_page_url": "/api/products?page=1",
            "to": 20,
            "total": 25,
            "data": [{ "id": 11, "name": "Riz" }]
        }))
        .unwrap();
        assert_eq!(page.total_pages(), 3);
        assert!(!page.is_last_page());
        assert_eq!(page.data[0]["name"], "Riz");
    }

    #[test]
    fn test_page_request_from_table_state() {
        let mut filter = BTreeMap::new();
        filter.insert("status".to_string(), "active".to_string());
        filter.insert("name".to_string(), "  ".to_string());
        let sort = SortState {
            field: "name".to_string(),
            ascending: false,
        };

        let request = PageRequest::from_table_state(0, 10, Some(&sort), &filter, " riz ");
        assert_eq!(request.page, 1);
        assert_eq!(request.sort.as_deref(), Some("-name"));
        assert_eq!(request.filter.unwrap().len(), 1);
        assert_eq!(request.search.as_deref(), Some("riz"));
    }

    #[test]
    fn test_sort_toggle() {
        let first = SortState::toggle(None, "name");
        assert!(first.ascending);
        let flipped = SortState::toggle(Some(&first), "name");
        assert!(!flipped.ascending);
        let other = SortState::toggle(Some(&flipped), "price");
        assert_eq!(other.to_param(), "price");
        assert_eq!(SortState::indicator(Some(&flipped), "name"), " ▼");
        assert_eq!(SortState::indicator(Some(&flipped), "price"), " ⇅");
    }

    #[test]
    fn test_header_display_uses_transformer() {
        let header = DatatableHeader::new("price", "Prix").with_transformer(Transformer::new(
            |v| Value::String(format!("{} Ar", to_display_string(v))),
        ));
        assert_eq!(header.display(&row(json!({ "price": 1500 }))), "1500 Ar");
        assert_eq!(DatatableHeader::new("missing", "X").display(&row(json!({}))), "");
    }

    #[test]
    fn test_selection_events() {
        let rows = vec![row(json!({ "id": 1 })), row(json!({ "id": 2 }))];
        let mut selection = Selection::new("id");

        selection.apply(&Selection::all_event(&rows, true));
        assert_eq!(selection.len(), 2);

        selection.apply(&Selection::row_event(&rows[0], false));
        assert!(!selection.is_selected(&rows[0]));
        assert!(selection.is_selected(&rows[1]));

        selection.apply(&Selection::all_event(&rows, false));
        assert!(selection.is_empty());
    }
}
