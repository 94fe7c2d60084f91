//! Error types for API client operations

use reqwest::StatusCode;
use serde_json::Value;

/// Errors surfaced by `ApiClient`.
///
/// A session that could not be recovered is not a separate kind: it is a
/// `Status` error with `401`, see [`ApiError::is_unauthorized`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("client configuration error: {0}")]
    Config(String),

    #[error("invalid request path: {0}")]
    InvalidPath(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("server returned {status}")]
    Status { status: StatusCode, body: Value },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("session storage error: {0}")]
    Session(#[from] session_store::Error),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// HTTP status for server-side rejections.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server payload attached to a status error.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// A 401 that survived the refresh-and-retry policy: the session is over.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// The `detail` string the backend attaches to most rejections.
    pub fn detail(&self) -> Option<&str> {
        self.body()?.get("detail")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_exposes_code_and_detail() {
        let err = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: json!({"detail": "Only the question author can accept an answer."}),
        };
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(
            err.detail(),
            Some("Only the question author can accept an answer.")
        );
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "server returned 403 Forbidden");
    }

    #[test]
    fn unauthorized_is_just_a_401() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: json!({"detail": "Given token not valid for any token type"}),
        };
        assert!(err.is_unauthorized());
    }

    #[test]
    fn non_status_errors_have_no_status() {
        let err = ApiError::MissingField("title");
        assert_eq!(err.status(), None);
        assert_eq!(err.detail(), None);
        assert_eq!(err.to_string(), "missing required field: title");
    }

    #[test]
    fn detail_ignores_non_string_payloads() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: json!({"title": ["This field is required."]}),
        };
        assert_eq!(err.detail(), None);
    }
}
