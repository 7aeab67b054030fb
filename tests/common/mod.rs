#![allow(dead_code)]

use std::sync::Arc;

use campus_client::auth::{CredentialStore, MemoryStore, StoreTokenHooks};
use campus_client::config::ClientConfig;
use campus_client::{ApiClient, CampusClient};
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub client: Arc<ApiClient>,
}

/// Mock server plus a client whose session lives in a fresh memory store
pub async fn harness() -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let client = ApiClient::new(&ClientConfig::with_base_url(server.uri()))
        .unwrap()
        .with_hooks(Arc::new(StoreTokenHooks::new(store.clone())));

    Harness {
        server,
        store,
        client: Arc::new(client),
    }
}

/// Mock server plus the full service bundle over a memory store
pub async fn campus() -> (MockServer, Arc<MemoryStore>, CampusClient) {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let campus =
        CampusClient::with_store(&ClientConfig::with_base_url(server.uri()), store.clone()).unwrap();
    (server, store, campus)
}

pub fn sign_in(store: &MemoryStore, access: &str, refresh: &str) {
    store.set("access_token", access).unwrap();
    store.set("refresh_token", refresh).unwrap();
}

pub fn stored(store: &MemoryStore, key: &str) -> Option<String> {
    store.get(key).unwrap()
}
