//! Dynamic forms: field model, attribute hydration, step pagination,
//! prefill and validation rules

pub mod hydrate_attrs;
pub mod pagination;
pub mod prefill;
pub mod rules;
pub mod types;
pub mod upload;
pub mod value;

pub use hydrate_attrs::{hydrate_attrs, hydrate_attrs_with, hydrate_on, AttributeBag, EventMap, ExtraAttrs, FieldEvent};
pub use pagination::{page_from_query, FormPagination, PageWindow, Step};
pub use prefill::{fill_form_value, form_result, get_one_form_value, get_one_value_from_key, prefill_form};
pub use rules::{RuleFn, RuleRegistry};
pub use types::*;
