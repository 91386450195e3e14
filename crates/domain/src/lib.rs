//! # SNAPI Domain
//!
//! Pure domain types for the SNAPI mobile API client.
//!
//! This crate contains:
//! - Session and credential value types (`SessionState`, `TokenPair`)
//! - Client configuration (`ClientConfig`)
//! - Wire-level constants (header names, storage keys, route prefixes)
//! - Domain error types and Result definitions
//! - Phone-number helpers shared by the call-screening features
//!
//! ## Architecture
//! - No dependencies on other SNAPI crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::phone::{format_dial_number, normalize_to_e164};
