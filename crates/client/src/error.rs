//! Error types for the ERP client.
//!
//! `HttpError` covers what can go wrong on the wire. `ApiError` is what
//! callers see: either the session is missing/rejected (`Unauthorized`) or a
//! request failed with a status code and a message fit for display.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Low-level transport and decoding failures.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection, timeout or TLS failure.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request path could not be joined onto the base URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors returned by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token in the session, or the backend answered 401.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered with a non-2xx status other than 401.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// A resource call failed; `message` names the operation.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// The backend answered 2xx with a body we cannot use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ApiError {
    /// HTTP status code this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Status { status, .. } | Self::RequestFailed { status, .. } => *status,
            Self::InvalidResponse(_) | Self::Http(_) => 500,
        }
    }

    /// Human-readable message, safe to show to users.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::Status { message, .. } | Self::RequestFailed { message, .. } => message.clone(),
            Self::InvalidResponse(_) | Self::Http(_) => "An unexpected error occurred".to_string(),
        }
    }

    /// Whether the caller should drop its session and sign in again.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Whether the backend reported that the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(HttpError::Transport(err))
    }
}

impl Serialize for ApiError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiError", 2)?;
        state.serialize_field("statusCode", &self.status_code())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_401() {
        let err = ApiError::Unauthorized;
        assert_eq!(err.status_code(), 401);
        assert!(err.is_unauthorized());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"statusCode": 401, "message": "Unauthorized"})
        );
    }

    #[test]
    fn test_request_failed_keeps_status_and_message() {
        let err = ApiError::RequestFailed {
            status: 503,
            message: "Failed to fetch leads".to_string(),
        };
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_string(), "Failed to fetch leads");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ApiError::from(HttpError::from(decode));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "An unexpected error occurred");
    }

    #[test]
    fn test_not_found_detection() {
        let err = ApiError::Status {
            status: 404,
            message: "Lead not found".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!ApiError::Unauthorized.is_not_found());
    }
}
