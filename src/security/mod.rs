//! Security module - Secret handling and log sanitization
//!
//! This module provides security primitives for:
//! - Holding tokens in zeroize-on-drop strings
//! - Masking and redacting secrets in diagnostics
//! - Validating identifiers spliced into request paths

mod sanitizer;
mod secure_string;

pub use sanitizer::{Sanitizer, SanitizerError, MAX_SNIPPET_BYTES, REDACTED};
pub use secure_string::SecureString;
