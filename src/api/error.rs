//! API client error types
//!
//! Maps every way a backend call can fail onto one enum. Callers decide
//! what to show; nothing here retries.

use thiserror::Error;

use crate::session::SessionError;

/// Errors from talking to the ledger backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend answered 401. The session has already been cleared and the
    /// client sent to the login page when this is returned.
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Login or registration refused; carries the backend's detail message
    #[error("{0}")]
    Auth(String),

    /// Any other non-success status, passed through unchanged
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// Connection refused or DNS failure
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Classify a transport-level failure
    pub(crate) fn transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(e)
        }
    }

    /// HTTP status behind the error, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Backend detail message, if one was sent
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Auth(detail) => Some(detail),
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 404,
            detail: Some("Account not found".to_string()),
        };
        assert_eq!(err.to_string(), "API error 404: Account not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.detail(), Some("Account not found"));

        let err = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "API error 500: no detail");
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::Unauthorized;
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert!(!ApiError::Timeout.is_unauthorized());
    }
}
