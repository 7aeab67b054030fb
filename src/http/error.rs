//! Error taxonomy surfaced by the request engine

use thiserror::Error;

use crate::auth::SecureStoreError;

/// Errors returned by [`ApiClient`](super::ApiClient) and the services built on it
///
/// None of the variants ever contain the Authorization header value; response
/// bodies are stored with the sent token redacted.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint URL could not be constructed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network-layer failure (DNS, connect, TLS, timeout)
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A response arrived but could not be read as a complete HTTP response
    #[error("Malformed HTTP response: {0}")]
    NotHttpResponse(String),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        body: String,
        request_id: Option<String>,
    },

    /// No usable session: no token, or the refresh-and-retry path is exhausted
    #[error("Authentication required")]
    Unauthenticated,

    /// The refresh call failed; stored credentials have been cleared
    #[error("Token refresh failed: {reason}")]
    RefreshFailed { reason: String },

    /// The response body did not match the expected shape
    #[error("Decoding error: {detail}")]
    Decoding { detail: String },

    /// Anything not otherwise classified
    #[error("Unexpected error: {message}")]
    Unknown { message: String },
}

impl ApiError {
    /// True when the UI should drop to its signed-out state
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::RefreshFailed { .. })
    }

    /// HTTP status, for [`ApiError::Http`]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server correlation id, for [`ApiError::Http`]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ApiError::Http { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn unknown(message: impl Into<String>) -> Self {
        ApiError::Unknown {
            message: message.into(),
        }
    }
}

impl From<SecureStoreError> for ApiError {
    fn from(e: SecureStoreError) -> Self {
        ApiError::unknown(format!("Credential storage error: {}", e))
    }
}
