//! campus-client - Authenticated client for a student learning platform
//!
//! Every call to the platform API passes through one request engine that
//! attaches the session's bearer token, refreshes it at most once across any
//! number of concurrent callers when the server answers 401, retries the
//! original call exactly once, and reports failures as a typed [`ApiError`].
//!
//! ## Architecture
//!
//! - **Security**: secure strings, redaction and path validation
//! - **Auth**: credential stores (OS keychain, in-memory) and token hooks
//! - **Http**: the request engine and refresh coordinator
//! - **Services**: typed wrappers for auth, student, chat and live-class endpoints
//!
//! ## Example
//!
//! ```no_run
//! use campus_client::{config::ClientConfig, CampusClient};
//!
//! # async fn demo() -> Result<(), campus_client::ApiError> {
//! campus_client::init_logging();
//!
//! let campus = CampusClient::new(&ClientConfig::load().with_env_overrides())?;
//! campus.auth.login("ana@example.edu", "correct horse").await?;
//! let dashboard = campus.student.dashboard().await?;
//! println!("{} unread messages", dashboard.unread_messages);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod http;
pub mod security;
pub mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use auth::{CredentialStore, SecureStore, StoreTokenHooks};
use config::ClientConfig;
pub use http::{ApiClient, ApiError, Empty, RequestOptions};
use services::{AuthService, ChatService, LiveClassService, StudentService};

/// The engine, its credential store and every service, wired to one session
///
/// Build one at startup and share it; all services hold the same
/// [`ApiClient`] and therefore the same refresh coordinator.
#[derive(Clone)]
pub struct CampusClient {
    /// Shared request engine
    pub client: Arc<ApiClient>,
    /// Store behind the session's token hooks
    pub store: Arc<dyn CredentialStore>,
    pub auth: AuthService,
    pub student: StudentService,
    pub chat: ChatService,
    pub live: LiveClassService,
}

impl CampusClient {
    /// Creates a client whose session lives in the OS keychain
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let store = Arc::new(SecureStore::with_service(config.keychain_service.as_str()));
        Self::with_store(config, store)
    }

    /// Creates a client whose session lives in `store`
    pub fn with_store(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let hooks = Arc::new(StoreTokenHooks::new(store.clone()));
        let client = Arc::new(ApiClient::new(config)?.with_hooks(hooks));

        tracing::debug!("API client ready for {}", client.base_url());

        Ok(Self {
            auth: AuthService::new(client.clone(), store.clone()),
            student: StudentService::new(client.clone()),
            chat: ChatService::new(client.clone()),
            live: LiveClassService::new(client.clone()),
            client,
            store,
        })
    }
}

/// Installs a `tracing` subscriber filtered by `RUST_LOG`
///
/// Debug output for this crate and info for everything else are always
/// enabled unless `RUST_LOG` says otherwise. Safe to call more than once; a
/// subscriber installed elsewhere is left in place.
pub fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["campus_client=debug", "info"] {
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("Ignoring log directive {}: {}", directive, e),
        }
    }

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging already initialized");
    }
}
