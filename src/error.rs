//! Error types for CLC API operations.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during CLC API operations.
#[derive(Debug, Error)]
pub enum ClcError {
    /// Configuration is missing or incomplete (e.g. no credentials).
    #[error("CLC configuration required: {0}")]
    ConfigMissing(String),

    /// Login was rejected with HTTP 400.
    #[error("Invalid V2 API login: {0}")]
    InvalidCredentials(String),

    /// Login failed with a status other than 400.
    #[error("Error logging into V2 API (response code {status_code}): {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    /// API request failed with a non-2xx status.
    #[error("Response code {status_code}. {message} {method} {url}")]
    Api {
        status_code: u16,
        message: String,
        body: ErrorBody,
        method: String,
        url: String,
    },

    /// A precondition was rejected before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Queued jobs finished but some of them failed on the provider side.
    #[error("{failed} of {total} queued request(s) failed")]
    OperationFailed { failed: usize, total: usize },

    /// Attribute absent from a loaded resource.
    #[error("'{kind}' instance has no attribute '{attribute}'")]
    AttributeNotFound {
        kind: &'static str,
        attribute: String,
    },

    /// Entity not found in a local collection.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A successful response did not carry the expected fields.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Reading a local resource (certificate bundle) failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClcError {
    /// HTTP status code carried by API and authentication failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } | Self::AuthenticationFailed { status_code, .. } => {
                Some(*status_code)
            }
            Self::InvalidCredentials(_) => Some(400),
            _ => None,
        }
    }
}

/// Body of a failed API response.
///
/// The provider usually answers with a JSON object carrying `message`; when
/// the body is not JSON the raw text is kept instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorBody {
    /// Parse a raw response body, falling back to text.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    /// The provider message, or the raw text when no message field exists.
    pub fn message(&self) -> String {
        match self {
            Self::Json(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            Self::Text(text) => text.clone(),
        }
    }

    /// The parsed JSON body, if any.
    pub fn json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Result type alias for CLC operations.
pub type Result<T> = core::result::Result<T, ClcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_prefers_json_message() {
        let body = ErrorBody::parse(r#"{"message":"The server is locked"}"#);
        assert_eq!(body.message(), "The server is locked");
        assert!(body.json().is_some());
    }

    #[test]
    fn test_error_body_falls_back_to_text() {
        let body = ErrorBody::parse("<html>Bad Gateway</html>");
        assert_eq!(body, ErrorBody::Text("<html>Bad Gateway</html>".to_string()));
        assert_eq!(body.message(), "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_attribute_not_found_names_kind_and_attribute() {
        let err = ClcError::AttributeNotFound {
            kind: "Disk",
            attribute: "mountPoint".to_string(),
        };
        assert_eq!(err.to_string(), "'Disk' instance has no attribute 'mountPoint'");
    }

    #[test]
    fn test_status_code_accessor() {
        let err = ClcError::Api {
            status_code: 500,
            message: "boom".to_string(),
            body: ErrorBody::Text("boom".to_string()),
            method: "GET".to_string(),
            url: "https://api.ctl.io/v2/servers/X/Y".to_string(),
        };
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(ClcError::Validation("x".into()).status_code(), None);
    }

    #[test]
    fn test_operation_failed_reports_counts() {
        let err = ClcError::OperationFailed {
            failed: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "1 of 3 queued request(s) failed");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_api_error_display_has_single_period() {
        let err = ClcError::Api {
            status_code: 404,
            message: "Server NOPE not found.".to_string(),
            body: ErrorBody::Text(String::new()),
            method: "GET".to_string(),
            url: "https://api.ctl.io/v2/servers/ACME/NOPE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Response code 404. Server NOPE not found. GET https://api.ctl.io/v2/servers/ACME/NOPE"
        );
    }
}
