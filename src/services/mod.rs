//! Services module - Typed wrappers over the platform endpoints
//!
//! Each service holds a shared [`ApiClient`](crate::http::ApiClient) and maps
//! one method to one endpoint. Services never touch tokens themselves; the
//! engine handles bearer attachment and refresh.

mod auth;
mod chat;
mod live;
pub mod models;
mod student;

pub use auth::AuthService;
pub use chat::ChatService;
pub use live::LiveClassService;
pub use models::*;
pub use student::StudentService;

use crate::http::ApiError;
use crate::security::Sanitizer;

/// Checks an identifier before it is spliced into a path
pub(crate) fn path_segment(id: &str) -> Result<&str, ApiError> {
    Sanitizer::validate_path_segment(id)
        .map(|_| id)
        .map_err(|e| ApiError::InvalidUrl(format!("Invalid path segment: {}", e)))
}
