use crate::dynamic_form::{FieldKind, NumberField, SelectOption, TextField};

/// Index of the first page in table state (0-based)
pub const DEFAULT_PAGE_NUMBER: usize = 0;
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Free text filter
pub fn filter_string() -> FieldKind {
    FieldKind::Input(TextField::default())
}

pub fn filter_number() -> FieldKind {
    FieldKind::Number(NumberField::default())
}

/// Select filter over a fixed set of statuses
pub fn filter_status(status: Vec<SelectOption>) -> FieldKind {
    FieldKind::select(status)
}
