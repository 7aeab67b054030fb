//! Credential storage backends
//!
//! The [`CredentialStore`] trait is the boundary to durable, encrypted storage.
//! [`SecureStore`] keeps entries in the OS keychain (Windows Credential
//! Manager, macOS Keychain, Linux Secret Service) through the keyring crate;
//! [`MemoryStore`] keeps them in process memory.

use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;

/// Errors that can occur during secure storage operations
#[derive(Debug, Error)]
pub enum SecureStoreError {
    /// Keyring operation failed
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Stored data could not be interpreted
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

/// Durable key-value storage for session credentials
///
/// Implementations must be safe to call from many tasks at once.
pub trait CredentialStore: Send + Sync {
    /// Reads a value, `None` when the key was never set
    fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError>;

    /// Writes a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError>;

    /// Removes a value
    ///
    /// Returns `Ok(true)` if deleted, `Ok(false)` if it was not present.
    fn delete(&self, key: &str) -> Result<bool, SecureStoreError>;
}

/// OS keychain store, one entry per key under a fixed service name
///
/// # Example
///
/// ```no_run
/// use campus_client::auth::{CredentialStore, SecureStore};
///
/// let store = SecureStore::new();
/// store.set("access_token", "my-token").unwrap();
/// assert_eq!(store.get("access_token").unwrap(), Some("my-token".to_string()));
/// store.delete("access_token").unwrap();
/// ```
pub struct SecureStore {
    service: String,
}

impl SecureStore {
    /// Creates a store with the default service name
    pub fn new() -> Self {
        Self::with_service("CampusClient")
    }

    /// Creates a store with a custom service name
    ///
    /// Useful for testing or separating installations.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the service name used for this store
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Default for SecureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for SecureStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SecureStoreError::Keyring(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError> {
        let entry = Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, SecureStoreError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(SecureStoreError::Keyring(e)),
        }
    }
}

/// In-process store; contents are lost when the process exits
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, SecureStoreError> {
        self.entries
            .lock()
            .map_err(|_| SecureStoreError::InvalidFormat("memory store lock poisoned".into()))
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, SecureStoreError> {
        Ok(self.lock()?.remove(key).is_some())
    }
}
