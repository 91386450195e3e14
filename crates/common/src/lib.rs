//! Credential persistence and session state shared by SNAPI crates.
//!
//! # Feature Tiers
//!
//! - `keychain` (default): OS keychain backend via the `keyring` crate
//! - `test-utils`: failure-injecting store mocks for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod storage;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::{generate_device_id, DeviceIdentityProvider, TokenStore};
#[cfg(feature = "keychain")]
pub use storage::KeychainSecureStore;
pub use storage::{MemorySecureStore, SecureStore, StorageError, StorageResult};
