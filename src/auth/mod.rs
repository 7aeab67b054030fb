//! Authentication module - Credential storage and token access
//!
//! Provides:
//! - Credential stores (OS keychain via keyring, in-memory)
//! - The session [`Credentials`] layout
//! - [`TokenHooks`], the request engine's narrow view of stored tokens
//! - Unverified JWT claim decoding for session identity

mod claims;
mod credentials;
mod hooks;
mod secure_store;

pub use claims::TokenClaims;
pub use credentials::{CredentialKey, Credentials, SessionIdentity};
pub use hooks::{NoSession, StoreTokenHooks, TokenHooks};
pub use secure_store::{CredentialStore, MemoryStore, SecureStore, SecureStoreError};

#[cfg(test)]
pub use hooks::MockTokenHooks;
