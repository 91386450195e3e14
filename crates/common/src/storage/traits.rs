//! Secure store trait
//!
//! Abstracts the platform credential store so the identity provider and the
//! token store can be tested against in-memory implementations.

use async_trait::async_trait;

use super::error::StorageResult;

/// Asynchronous key-value store for secrets
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written or was deleted
    ///
    /// # Errors
    /// Returns error if the backing store cannot be read
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns error if the backing store rejects the write
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value (idempotent)
    ///
    /// # Errors
    /// Returns error if the backing store rejects the delete
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
