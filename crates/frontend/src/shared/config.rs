//! Конфигурация библиотеки, доступная компонентам через контекст

use std::sync::Arc;

use contracts::config::LibraryConfig;
use leptos::prelude::*;

/// Make `config` the configuration of every component below this point
pub fn provide_library_config(config: LibraryConfig) {
    provide_context(Arc::new(config));
}

/// Configuration provided by an ancestor, or the embedded defaults
pub fn use_library_config() -> Arc<LibraryConfig> {
    use_context::<Arc<LibraryConfig>>().unwrap_or_else(|| Arc::new(LibraryConfig::embedded().clone()))
}

/// Page size asked by the caller, else the configured default
pub fn page_limit(limit: Option<usize>, config: &LibraryConfig) -> usize {
    limit
        .filter(|limit| *limit > 0)
        .unwrap_or(config.pagination.default_page_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_limit_follows_config() {
        let mut config = LibraryConfig::embedded().clone();
        assert_eq!(page_limit(None, &config), 10);

        config.pagination.default_page_limit = 25;
        assert_eq!(page_limit(None, &config), 25);
        assert_eq!(page_limit(Some(0), &config), 25);
        assert_eq!(page_limit(Some(5), &config), 5);
    }
}
