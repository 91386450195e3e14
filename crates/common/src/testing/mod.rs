//! Testing utilities
//!
//! - **[`mocks`]**: secure store with injectable failures and call counters
//!
//! Enabled for downstream crates through the `test-utils` feature.

pub mod mocks;

pub use mocks::FlakySecureStore;
