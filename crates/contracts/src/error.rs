//! Error types shared by the form core

use serde_json::Value;
use thiserror::Error;

/// Errors produced by validation, value assignment and configuration
#[derive(Error, Debug)]
pub enum FormError {
    /// A rule rejected the value; the message is ready for display
    #[error("{0}")]
    Validation(String),

    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),

    #[error("Invalid rule expression: {0}")]
    InvalidExpression(String),

    /// A raw value could not be converted into the field's value type
    #[error("Cannot assign value to field '{field}': {message}")]
    Conversion { field: String, message: String },
}

impl FormError {
    pub fn conversion(field: &str, message: impl Into<String>) -> Self {
        Self::Conversion {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Message to show next to the field
    pub fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error returned by caller-supplied fetchers, uploaders and deleters
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    /// Decoded response body, when the backend answered with an error payload
    pub response: Option<Value>,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }
}
