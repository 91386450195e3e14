//! Secure key-value storage
//!
//! The credential store is an opaque async get/set/delete capability that
//! survives process restarts. Every operation is individually fallible; the
//! consumers in [`crate::auth`] recover from failures locally.

pub mod error;
#[cfg(feature = "keychain")]
pub mod keychain;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
#[cfg(feature = "keychain")]
pub use keychain::KeychainSecureStore;
pub use memory::MemorySecureStore;
pub use traits::SecureStore;
