//! Token hooks - the request engine's only view of the credential store
//!
//! The engine reads and replaces tokens through [`TokenHooks`] and never
//! touches storage directly. Hooks are infallible by contract: storage errors
//! are logged and reads degrade to `None`, which at worst costs one extra
//! refresh cycle downstream.

use std::sync::Arc;

use super::credentials::{CredentialKey, Credentials};
use super::secure_store::CredentialStore;
use crate::security::SecureString;

/// Capability bundle for reading and replacing session tokens
///
/// Implementations must be cheap, non-blocking and safe under concurrent use.
#[cfg_attr(test, mockall::automock)]
pub trait TokenHooks: Send + Sync {
    /// Current access token, if any
    fn access_token(&self) -> Option<SecureString>;

    /// Current refresh token, if any
    fn refresh_token(&self) -> Option<SecureString>;

    /// Persists a freshly minted token pair
    fn set_tokens(&self, access: SecureString, refresh: SecureString);

    /// Drops the whole session (forces sign-out)
    fn clear_tokens(&self);
}

/// Hooks for contexts without a session, e.g. calls made before login
///
/// Reads always return `None`; writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSession;

impl TokenHooks for NoSession {
    fn access_token(&self) -> Option<SecureString> {
        None
    }

    fn refresh_token(&self) -> Option<SecureString> {
        None
    }

    fn set_tokens(&self, _access: SecureString, _refresh: SecureString) {}

    fn clear_tokens(&self) {}
}

/// Hooks backed by a [`CredentialStore`]
pub struct StoreTokenHooks {
    store: Arc<dyn CredentialStore>,
}

impl StoreTokenHooks {
    /// Wraps a credential store
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: CredentialKey) -> Option<SecureString> {
        match self.store.get(key.as_str()) {
            Ok(value) => value.map(SecureString::new).and_then(SecureString::non_empty),
            Err(e) => {
                tracing::warn!("Failed to read {} from credential store: {}", key.as_str(), e);
                None
            }
        }
    }
}

impl TokenHooks for StoreTokenHooks {
    fn access_token(&self) -> Option<SecureString> {
        self.read(CredentialKey::AccessToken)
    }

    fn refresh_token(&self) -> Option<SecureString> {
        self.read(CredentialKey::RefreshToken)
    }

    fn set_tokens(&self, access: SecureString, refresh: SecureString) {
        if let Err(e) = self
            .store
            .set(CredentialKey::AccessToken.as_str(), access.as_str())
        {
            tracing::warn!("Failed to persist access token: {}", e);
        }
        if let Err(e) = self
            .store
            .set(CredentialKey::RefreshToken.as_str(), refresh.as_str())
        {
            tracing::warn!("Failed to persist refresh token: {}", e);
        }
    }

    fn clear_tokens(&self) {
        if let Err(e) = Credentials::clear(self.store.as_ref()) {
            tracing::warn!("Failed to clear credentials: {}", e);
        }
    }
}
