#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use snapi_common::{MemorySecureStore, SecureStore};
use snapi_domain::constants::{ACCESS_TOKEN_KEY, DEVICE_ID_KEY, REFRESH_TOKEN_KEY};
use snapi_domain::ClientConfig;
use snapi_infra::ApiClient;
use wiremock::MockServer;

pub const DEVICE_ID: &str = "snapi-test-device";
pub const APP_KEY: &str = "key-abc123";

/// Store pre-seeded with a device id so header assertions are deterministic.
pub fn seeded_store() -> Arc<MemorySecureStore> {
    Arc::new(MemorySecureStore::with_entries([(DEVICE_ID_KEY, DEVICE_ID)]))
}

pub fn authed_store(access: &str, refresh: &str) -> Arc<MemorySecureStore> {
    Arc::new(MemorySecureStore::with_entries([
        (DEVICE_ID_KEY, DEVICE_ID),
        (ACCESS_TOKEN_KEY, access),
        (REFRESH_TOKEN_KEY, refresh),
    ]))
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri(), Some(APP_KEY.to_string()))
}

pub fn client_with(config: ClientConfig, store: Arc<dyn SecureStore>) -> ApiClient {
    ApiClient::builder().config(config).store(store).build().expect("client should build")
}

/// Client pointed at `server`, hydrated from `store`.
pub async fn hydrated_client(server: &MockServer, store: Arc<dyn SecureStore>) -> ApiClient {
    let client = client_with(config_for(server), store);
    client.hydrate().await;
    client
}

/// A local address with nothing listening on it.
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

pub async fn requests_to(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == path)
        .count()
}
