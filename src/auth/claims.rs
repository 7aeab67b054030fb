//! Unverified reads of JWT access-token payloads
//!
//! Only used to fill in session identity the login response leaves out. The
//! signature is not checked; nothing here is trusted for authorization.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Subset of standard and platform claims we care about
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id)
    pub sub: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    /// Expiry as seconds since the epoch
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decodes the payload segment of a compact JWT
    ///
    /// Returns `None` for anything that is not a three-part token with a
    /// base64url JSON payload.
    pub fn decode(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        // Some issuers pad anyway
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// True if the token carries an expiry that has passed
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}
