//! HTTP module - The request engine and its error taxonomy
//!
//! Provides:
//! - [`ApiClient`], the single chokepoint for every API call
//! - [`RefreshCoordinator`], single-flight token refresh
//! - [`RequestOptions`] and the [`Empty`] response sentinel
//! - [`ApiError`]

mod client;
mod coordinator;
mod error;
mod request;
mod response;

pub use client::{ApiClient, REFRESH_PATH};
pub use coordinator::RefreshCoordinator;
pub use error::ApiError;
pub use request::{Empty, RequestOptions};
