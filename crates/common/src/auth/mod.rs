//! Device identity and session credentials
//!
//! ```text
//! ┌────────────────────────┐     ┌──────────────┐
//! │ DeviceIdentityProvider │────►│              │
//! └────────────────────────┘     │ SecureStore  │
//! ┌────────────────────────┐     │ (keychain /  │
//! │ TokenStore             │────►│  in-memory)  │
//! │  └─ SessionState mirror│     └──────────────┘
//! └────────────────────────┘
//! ```
//!
//! Both components treat storage failures as recoverable: identity falls
//! back to an ephemeral id, and the token store falls back to the signed-out
//! state. Neither ever returns an error to its caller.

pub mod identity;
pub mod token_store;

pub use identity::{generate_device_id, DeviceIdentityProvider};
pub use token_store::TokenStore;
