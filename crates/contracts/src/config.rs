use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LibraryConfig {
    pub pagination: PaginationConfig,
    pub form: FormConfig,
    pub file: FileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PaginationConfig {
    /// Page size used by datatables when the caller gives none
    pub default_page_limit: usize,
    /// Prefix of the stepper labels ("Etape 1", "Etape 2", ...)
    pub step_label: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FormConfig {
    pub empty_filter_message: String,
    /// Fallback message, `{field}` is replaced by the field label
    pub default_validation_message: String,
    pub submit_label: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    pub doc_preview_img_url: String,
    pub video_preview_img_url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Default configuration embedded in the library
const DEFAULT_CONFIG: &str = r#"
[pagination]
default_page_limit = 10
step_label = "Etape"

[form]
empty_filter_message = "Pas de résultat"
default_validation_message = "Le champ {field} est invalide"
submit_label = "Valider"

[file]
doc_preview_img_url = "/images/Doc.jpg"
video_preview_img_url = "/images/Video.jpg"

[logging]
level = "info"
"#;

static EMBEDDED: Lazy<LibraryConfig> = Lazy::new(|| match toml::from_str(DEFAULT_CONFIG) {
    Ok(config) => config,
    Err(err) => panic!("embedded default config is invalid: {}", err),
});

impl LibraryConfig {
    /// Configuration parsed once from the embedded defaults
    pub fn embedded() -> &'static LibraryConfig {
        &EMBEDDED
    }

    /// Load a caller-provided TOML document
    ///
    /// Missing sections are not merged with the defaults: the document must
    /// be complete except for `[logging]`.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: LibraryConfig = toml::from_str(contents)?;
        log::info!("Loaded varotra configuration ({} bytes)", contents.len());
        Ok(config)
    }

    pub fn log_level(&self) -> log::Level {
        match self.logging.level.to_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::embedded().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<LibraryConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.pagination.default_page_limit, crate::datatable::DEFAULT_PAGE_LIMIT);
        assert_eq!(config.pagination.step_label, "Etape");
        assert_eq!(config.file.doc_preview_img_url, "/images/Doc.jpg");
    }

    #[test]
    fn test_custom_config_without_logging_section() {
        let config = LibraryConfig::from_toml_str(
            r#"
            [pagination]
            default_page_limit = 25
            step_label = "Step"

            [form]
            empty_filter_message = "No result"
            default_validation_message = "{field} is invalid"
            submit_label = "Submit"

            [file]
            doc_preview_img_url = "/doc.png"
            video_preview_img_url = "/video.png"
            "#,
        )
        .unwrap();
        assert_eq!(config.pagination.default_page_limit, 25);
        assert_eq!(config.log_level(), log::Level::Info);
        let rules = crate::dynamic_form::RuleRegistry::with_config(&config);
        assert_eq!(rules.default_message_for("Email"), "Email is invalid");
    }

    #[test]
    fn test_incomplete_config_is_rejected() {
        assert!(LibraryConfig::from_toml_str("[pagination]\ndefault_page_limit = 5").is_err());
    }
}
