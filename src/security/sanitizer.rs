//! Scrubbing for anything that ends up in logs or error values
//!
//! The request engine routes URLs, response bodies and caller-supplied path
//! segments through here so that credentials never leak into diagnostics.

use thiserror::Error;

/// Placeholder written in place of a redacted secret
pub const REDACTED: &str = "[REDACTED]";

/// Upper bound for response-body snippets embedded in errors
pub const MAX_SNIPPET_BYTES: usize = 800;

/// Reasons a dynamic path segment is rejected
#[derive(Debug, Error, PartialEq)]
pub enum SanitizerError {
    /// Segment is empty
    #[error("Path segment cannot be empty")]
    EmptyInput,

    /// Segment contains a character that would change the URL structure
    #[error("Path segment contains invalid character {0:?}")]
    InvalidCharacter(char),

    /// Segment exceeds the allowed length
    #[error("Path segment exceeds maximum length of {0}")]
    TooLong(usize),
}

/// Static helpers for masking secrets and bounding diagnostic output
pub struct Sanitizer;

impl Sanitizer {
    /// Masks a token for display, keeping only the last 4 characters
    ///
    /// # Examples
    ///
    /// ```
    /// use campus_client::security::Sanitizer;
    ///
    /// assert_eq!(Sanitizer::sanitize_token("eyJhbGciOiJIUzI1NiJ9.abcd"), "***abcd");
    /// assert_eq!(Sanitizer::sanitize_token("abc"), "****");
    /// ```
    pub fn sanitize_token(token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() > 4 {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("***{}", tail)
        } else {
            "****".to_string()
        }
    }

    /// Strips query string and fragment from a URL before logging it
    ///
    /// # Examples
    ///
    /// ```
    /// use campus_client::security::Sanitizer;
    ///
    /// assert_eq!(
    ///     Sanitizer::sanitize_url("https://api.example.edu/student/calendar?from=2024-01-01"),
    ///     "https://api.example.edu/student/calendar"
    /// );
    /// ```
    pub fn sanitize_url(url: &str) -> String {
        let end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
        url[..end].to_string()
    }

    /// Replaces every occurrence of `secret` in `text` with [`REDACTED`]
    ///
    /// Empty secrets leave the text untouched.
    pub fn redact_secret(text: &str, secret: &str) -> String {
        if secret.is_empty() {
            return text.to_string();
        }
        text.replace(secret, REDACTED)
    }

    /// Truncates text to at most `max_bytes`, cutting on a char boundary
    ///
    /// Appends `…` when something was dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use campus_client::security::Sanitizer;
    ///
    /// assert_eq!(Sanitizer::snippet("hello world", 5), "hello…");
    /// assert_eq!(Sanitizer::snippet("short", 800), "short");
    /// ```
    pub fn snippet(text: &str, max_bytes: usize) -> String {
        if text.len() <= max_bytes {
            return text.to_string();
        }
        let mut end = max_bytes;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &text[..end])
    }

    /// Validates an identifier that will be spliced into a URL path
    ///
    /// Rejects anything that could escape the segment: separators, query and
    /// fragment markers, percent escapes, whitespace and control characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use campus_client::security::Sanitizer;
    ///
    /// assert!(Sanitizer::validate_path_segment("course-42").is_ok());
    /// assert!(Sanitizer::validate_path_segment("../admin").is_err());
    /// ```
    pub fn validate_path_segment(segment: &str) -> Result<(), SanitizerError> {
        const MAX_SEGMENT_LEN: usize = 128;

        if segment.is_empty() {
            return Err(SanitizerError::EmptyInput);
        }
        if segment.len() > MAX_SEGMENT_LEN {
            return Err(SanitizerError::TooLong(MAX_SEGMENT_LEN));
        }
        if segment == "." || segment == ".." {
            return Err(SanitizerError::InvalidCharacter('.'));
        }

        let forbidden = ['/', '\\', '?', '#', '%', '&', '<', '>', '"', '\''];
        if let Some(c) = segment
            .chars()
            .find(|c| forbidden.contains(c) || c.is_whitespace() || c.is_control())
        {
            return Err(SanitizerError::InvalidCharacter(c));
        }

        Ok(())
    }
}
