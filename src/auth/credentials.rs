//! Session credentials and their layout in the credential store

use serde::{Deserialize, Serialize};

use super::secure_store::{CredentialStore, SecureStoreError};
use crate::security::SecureString;

/// Keys under which a session is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    Role,
    UserId,
    Email,
}

impl CredentialKey {
    /// Every key, in the order they are written
    pub const ALL: [CredentialKey; 5] = [
        CredentialKey::AccessToken,
        CredentialKey::RefreshToken,
        CredentialKey::Role,
        CredentialKey::UserId,
        CredentialKey::Email,
    ];

    /// Storage key string
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "access_token",
            CredentialKey::RefreshToken => "refresh_token",
            CredentialKey::Role => "role",
            CredentialKey::UserId => "user_id",
            CredentialKey::Email => "email",
        }
    }
}

/// Identity attached to the signed-in session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub role: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

/// Everything the store holds for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub access_token: Option<SecureString>,
    pub refresh_token: Option<SecureString>,
    pub identity: SessionIdentity,
}

impl Credentials {
    /// Reads the full session from the store
    pub fn load(store: &dyn CredentialStore) -> Result<Self, SecureStoreError> {
        let token = |key: CredentialKey| -> Result<Option<SecureString>, SecureStoreError> {
            Ok(store
                .get(key.as_str())?
                .map(SecureString::new)
                .and_then(SecureString::non_empty))
        };

        Ok(Self {
            access_token: token(CredentialKey::AccessToken)?,
            refresh_token: token(CredentialKey::RefreshToken)?,
            identity: SessionIdentity {
                role: store.get(CredentialKey::Role.as_str())?,
                user_id: store.get(CredentialKey::UserId.as_str())?,
                email: store.get(CredentialKey::Email.as_str())?,
            },
        })
    }

    /// Writes every present field; absent fields are deleted
    pub fn save(&self, store: &dyn CredentialStore) -> Result<(), SecureStoreError> {
        let fields: [(CredentialKey, Option<&str>); 5] = [
            (
                CredentialKey::AccessToken,
                self.access_token.as_ref().map(|t| t.as_str()),
            ),
            (
                CredentialKey::RefreshToken,
                self.refresh_token.as_ref().map(|t| t.as_str()),
            ),
            (CredentialKey::Role, self.identity.role.as_deref()),
            (CredentialKey::UserId, self.identity.user_id.as_deref()),
            (CredentialKey::Email, self.identity.email.as_deref()),
        ];

        for (key, value) in fields {
            match value {
                Some(v) => store.set(key.as_str(), v)?,
                None => {
                    store.delete(key.as_str())?;
                }
            }
        }
        Ok(())
    }

    /// Removes every credential key
    ///
    /// Attempts all keys even if one fails, then reports the first error.
    pub fn clear(store: &dyn CredentialStore) -> Result<(), SecureStoreError> {
        let mut first_error = None;
        for key in CredentialKey::ALL {
            if let Err(e) = store.delete(key.as_str()) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// True when an access token is present
    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }
}
