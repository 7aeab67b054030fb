//! Zeroize-on-drop string for access and refresh tokens
//!
//! Tokens pass through the request engine, the token hooks and the credential
//! store. Keeping them in a `SecureString` means they are wiped when the last
//! copy is dropped and never show up in `{:?}` output.

use std::fmt;
use std::ops::Deref;
use zeroize::Zeroize;

/// A token or other secret string that clears its memory when dropped
///
/// # Example
///
/// ```
/// use campus_client::security::SecureString;
///
/// let token = SecureString::new("eyJhbGciOi.payload.sig".to_string());
/// assert_eq!(token.as_str(), "eyJhbGciOi.payload.sig");
/// assert!(!format!("{:?}", token).contains("payload"));
/// ```
#[derive(Clone, Default)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Wraps an owned string; its buffer is zeroed on drop
    pub fn new(s: String) -> Self {
        Self { inner: s }
    }

    /// Returns the secret as a slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns true if the secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `None` for empty secrets
    ///
    /// Servers and stores sometimes hand back `""` where they mean "no token".
    pub fn non_empty(self) -> Option<Self> {
        if self.inner.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_owned())
    }
}

// No Display impl: tokens must be exposed explicitly through as_str()
impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(<{} bytes redacted>)", self.inner.len())
    }
}

/// Compares without short-circuiting on the first differing byte
impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.inner.as_bytes(), other.inner.as_bytes());
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
    }
}

impl Eq for SecureString {}
