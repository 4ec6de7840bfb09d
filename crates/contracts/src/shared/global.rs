use crate::error::FetchError;

/// Message to show for a failed backend call
///
/// Prefers the `message` of the backend response body when the server
/// answered, falls back to the transport error otherwise.
pub fn dynamic_error(error: &FetchError) -> String {
    match &error.response {
        Some(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_default(),
        None => error.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dynamic_error_prefers_backend_message() {
        let error = FetchError::new("Request failed with status code 422")
            .with_response(json!({ "message": "Le nom est déjà pris" }));
        assert_eq!(dynamic_error(&error), "Le nom est déjà pris");
    }

    #[test]
    fn test_dynamic_error_without_response() {
        let error = FetchError::new("Network Error");
        assert_eq!(dynamic_error(&error), "Network Error");
    }

    #[test]
    fn test_dynamic_error_body_without_message() {
        let error = FetchError::new("boom").with_response(json!({ "errors": [] }));
        assert_eq!(dynamic_error(&error), "");
    }
}
