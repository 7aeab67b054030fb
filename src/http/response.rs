//! Buffered responses and typed decoding

use std::any::{Any, TypeId};

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::request::Empty;
use crate::security::{Sanitizer, MAX_SNIPPET_BYTES};

/// Correlation headers, checked in this order
const REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "x-requestid", "request-id"];

/// A fully read response
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub request_id: Option<String>,
}

impl RawResponse {
    /// Body as text with `secret` (the bearer that was sent) redacted
    pub fn body_text(&self, secret: Option<&str>) -> String {
        let text = String::from_utf8_lossy(&self.body);
        match secret {
            Some(secret) => Sanitizer::redact_secret(&text, secret),
            None => text.into_owned(),
        }
    }

    /// Converts a non-success response into [`ApiError::Http`]
    pub fn into_http_error(self, secret: Option<&str>) -> ApiError {
        ApiError::Http {
            status: self.status.as_u16(),
            body: self.body_text(secret),
            request_id: self.request_id,
        }
    }
}

/// Extracts the server's correlation id, if any
///
/// Header names are case-insensitive in [`HeaderMap`].
pub(crate) fn request_id(headers: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Decodes a success body into `T`
///
/// [`Empty`] short-circuits without looking at the body. An empty body for
/// any other type is an error naming the type; parse failures carry a bounded
/// snippet of the body.
pub(crate) fn decode_body<T>(response: &RawResponse, secret: Option<&str>) -> Result<T, ApiError>
where
    T: DeserializeOwned + 'static,
{
    if TypeId::of::<T>() == TypeId::of::<Empty>() {
        let empty: Box<dyn Any> = Box::new(Empty);
        if let Ok(value) = empty.downcast::<T>() {
            return Ok(*value);
        }
    }

    let type_name = std::any::type_name::<T>();

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Decoding {
            detail: format!("Empty response body, expected {}", type_name),
        });
    }

    serde_json::from_slice(&response.body).map_err(|e| {
        let snippet = Sanitizer::snippet(&response.body_text(secret), MAX_SNIPPET_BYTES);
        ApiError::Decoding {
            detail: format!("Failed to decode {}: {}; body: {}", type_name, e, snippet),
        }
    })
}
