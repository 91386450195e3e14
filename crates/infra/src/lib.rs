//! # SNAPI Infrastructure
//!
//! Network side of the SNAPI mobile client.
//!
//! This crate contains:
//! - The HTTP transport (`http`)
//! - The session-aware API layer (`api`): request composition, dispatch with
//!   401 refresh-and-retry, single-flight token refresh, mutation
//!   de-duplication, typed actions and allowlist sync
//! - Configuration loading (`config`)
//! - Logging setup (`observability`)
//!
//! ## Architecture
//! - Depends on `snapi-domain` for types and `snapi-common` for credential
//!   storage
//! - Contains all network I/O

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, ApiCommands, ApiError, ErrorCode, RequestBody, RequestOptions};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
