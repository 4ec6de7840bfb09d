//! Datatable configuration and Laravel-style pagination types

pub mod constants;
mod types;

pub use constants::{filter_number, filter_status, filter_string, DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_NUMBER};
pub use types::{
    DatatableHeader, DatatableSelectEvent, PageRequest, PaginatedData, PaginatedLink,
    SelectEventType, Selection, SortState, Transformer,
};
