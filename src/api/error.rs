//! Error type for REST store operations.
//!
//! Every backend failure folds into [`ApiError`] so callers match on one
//! taxonomy regardless of transport. Server-reported failures keep the
//! HTTP status plus the machine-readable `code` from the response
//! envelope (`{"error": {"code", "message", "details"}}`).

use std::fmt;

use serde_json::Value;

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    Status {
        status: u16,
        code: String,
        message: String,
        details: Option<Value>,
    },
    /// The request never produced a response.
    Transport(String),
    /// The response arrived but could not be decoded.
    Decode(String),
}

impl ApiError {
    /// Build a status error with no details.
    pub fn status(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details to a status error. No-op for other
    /// variants.
    pub fn with_details(self, details: Value) -> Self {
        match self {
            ApiError::Status {
                status,
                code,
                message,
                ..
            } => ApiError::Status {
                status,
                code,
                message,
                details: Some(details),
            },
            other => other,
        }
    }

    /// Interpret a non-success response body.
    ///
    /// The hosted API wraps failures as `{"error": {code, message,
    /// details}}`. A body that is not JSON at all becomes `UNKNOWN_ERROR`
    /// with an HTTP-status message; an envelope missing `code` or
    /// `message` falls back per field.
    pub fn from_response(status: u16, status_text: &str, body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) => {
                return ApiError::status(
                    status,
                    "UNKNOWN_ERROR",
                    format!("HTTP {}: {}", status, status_text),
                );
            }
        };

        let error = value.get("error");
        let code = error
            .and_then(|e| e.get("code"))
            .and_then(Value::as_str)
            .unwrap_or("API_ERROR");
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("An error occurred");
        let details = error.and_then(|e| e.get("details")).cloned();

        ApiError::Status {
            status,
            code: code.to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// HTTP status, when the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code, when the server answered.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Status { code, .. } => Some(code),
            _ => None,
        }
    }

    /// True for 401 and 403 responses.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status_code(), Some(401) | Some(403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub fn is_validation(&self) -> bool {
        self.status_code() == Some(422)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status {
                status,
                code,
                message,
                ..
            } => write!(f, "{} ({}): {}", code, status, message),
            ApiError::Transport(msg) => write!(f, "transport error: {}", msg),
            ApiError::Decode(msg) => write!(f, "could not decode response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
