//! Leptos rendering of dynamic forms

pub mod field;
pub mod file_upload;
pub mod form;
pub mod lazy_select;
pub mod use_pagination;

use std::sync::Arc;

use contracts::dynamic_form::RuleRegistry;
use leptos::prelude::*;

pub use field::DynamicField;
pub use form::DynamicForm;
pub use use_pagination::{use_form_pagination, FormPaginationState};

/// Make `registry` the validation rules of every form below this point
pub fn provide_rule_registry(registry: RuleRegistry) {
    provide_context(Arc::new(registry));
}

/// Rules provided by an ancestor, or the default rule set
pub fn use_rule_registry() -> Arc<RuleRegistry> {
    use_context::<Arc<RuleRegistry>>().unwrap_or_else(|| {
        log::debug!("No RuleRegistry in context, using the default rules");
        Arc::new(RuleRegistry::with_default_rules())
    })
}
