//! Per-call request options and the empty-response sentinel

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::security::SecureString;

/// Result type for endpoints that return no meaningful body
///
/// Requests typed as `Empty` skip decoding entirely, so 204s and endpoints
/// answering with `OK` or other non-JSON text both succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty;

/// Options for a single request
///
/// Defaults: authenticated, no explicit token, client-wide timeout.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Bearer token to use instead of the stored one
    pub access_token: Option<SecureString>,
    /// Whether the call needs a session; unauthenticated calls never refresh
    pub requires_auth: bool,
    /// Overrides the client's default timeout
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            access_token: None,
            requires_auth: true,
            timeout: None,
        }
    }
}

impl RequestOptions {
    /// Options for an authenticated call (the default)
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Options for a call made without a session, e.g. login
    pub fn anonymous() -> Self {
        Self {
            requires_auth: false,
            ..Self::default()
        }
    }

    /// Uses `token` as the bearer instead of the stored access token
    pub fn with_access_token(mut self, token: impl Into<SecureString>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets a per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
