//! Mock implementations of storage traits
//!
//! Provides mock objects for testing purposes.

// Test mocks keep error docs minimal; failures are visible in return types.
#![allow(clippy::missing_errors_doc)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::storage::{MemorySecureStore, SecureStore, StorageError, StorageResult};

/// In-memory secure store whose reads, writes and deletes can be made to fail
///
/// # Examples
///
/// ```
/// use snapi_common::storage::SecureStore;
/// use snapi_common::testing::FlakySecureStore;
///
/// # tokio_test::block_on(async {
/// let store = FlakySecureStore::new();
/// store.set("k", "v").await.unwrap();
///
/// store.fail_reads(true);
/// assert!(store.get("k").await.is_err());
/// assert_eq!(store.get_calls(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct FlakySecureStore {
    inner: MemorySecureStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl FlakySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying store, bypassing failure injection and counters.
    pub fn inner(&self) -> &MemorySecureStore {
        &self.inner
    }

    pub fn fail_reads(&self, enabled: bool) {
        self.fail_reads.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, enabled: bool) {
        self.fail_deletes.store(enabled, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn injected(op: &str, key: &str) -> StorageError {
        StorageError::AccessFailed(format!("injected {op} failure for {key}"))
    }
}

#[async_trait]
impl SecureStore for FlakySecureStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read", key));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("write", key));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::injected("delete", key));
        }
        self.inner.delete(key).await
    }
}
