//! Platform keychain store
//!
//! Thin wrapper over the OS credential store (macOS Keychain, Windows
//! Credential Manager, Linux Secret Service) via the `keyring` crate. Each
//! logical key becomes one keyring entry under the configured service name.
//!
//! ```no_run
//! use snapi_common::storage::{KeychainSecureStore, SecureStore};
//!
//! # async fn demo() -> Result<(), snapi_common::StorageError> {
//! let store = KeychainSecureStore::new("SNAPI.mobile");
//! store.set("snapi_access_token", "secret").await?;
//! assert_eq!(store.get("snapi_access_token").await?.as_deref(), Some("secret"));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::traits::SecureStore;

/// Secure store persisted in the platform keychain
#[derive(Debug, Clone)]
pub struct KeychainSecureStore {
    service_name: String,
}

impl KeychainSecureStore {
    /// Create a store for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "SNAPI.mobile")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(service: &str, key: &str) -> StorageResult<Entry> {
        Entry::new(service, key).map_err(|e| map_keyring_error(key, e))
    }

    fn get_blocking(service: &str, key: &str) -> StorageResult<Option<String>> {
        debug!(service = %service, key = %key, "Retrieving secret from keychain");

        match Self::entry(service, key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(key, e)),
        }
    }

    fn set_blocking(service: &str, key: &str, value: &str) -> StorageResult<()> {
        debug!(service = %service, key = %key, "Storing secret in keychain");

        Self::entry(service, key)?.set_password(value).map_err(|e| map_keyring_error(key, e))
    }

    fn delete_blocking(service: &str, key: &str) -> StorageResult<()> {
        debug!(service = %service, key = %key, "Deleting secret from keychain");

        match Self::entry(service, key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(map_keyring_error(key, e)),
        }
    }
}

fn map_keyring_error(key: &str, err: keyring::Error) -> StorageError {
    match err {
        keyring::Error::BadEncoding(_) => StorageError::BadEncoding { key: key.to_string() },
        keyring::Error::NoStorageAccess(inner) => StorageError::Unavailable(inner.to_string()),
        keyring::Error::PlatformFailure(inner) => {
            StorageError::AccessFailed(format!("platform error for {key}: {inner}"))
        }
        other => StorageError::AccessFailed(format!("{key}: {other}")),
    }
}

// Keyring calls block on platform IPC, so each one runs on the blocking pool.
#[async_trait]
impl SecureStore for KeychainSecureStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let service = self.service_name.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::get_blocking(&service, &key)).await?
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let service = self.service_name.clone();
        let key = key.to_string();
        let value = value.to_string();
        tokio::task::spawn_blocking(move || Self::set_blocking(&service, &key, &value)).await?
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let service = self.service_name.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::delete_blocking(&service, &key)).await?
    }
}
