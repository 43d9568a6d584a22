//! Standardized API error responses (RFC 7807).

use serde::{Deserialize, Serialize};

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Individual field problems for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            errors: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(409, "Conflict").with_detail(detail)
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::new(422, "Validation Failed")
        }
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_lists_errors_without_detail() {
        let body = serde_json::to_value(ErrorResponse::validation(vec![
            "name must be 1-100 characters".to_string(),
        ]))
        .unwrap();

        assert_eq!(body["type"], "about:blank");
        assert_eq!(body["status"], 422);
        assert_eq!(body["errors"][0], "name must be 1-100 characters");
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn test_not_found_skips_empty_errors() {
        let body = serde_json::to_value(ErrorResponse::not_found("No tag 'rust'")).unwrap();

        assert_eq!(body["title"], "Not Found");
        assert_eq!(body["detail"], "No tag 'rust'");
        assert!(body.get("errors").is_none());
    }
}
