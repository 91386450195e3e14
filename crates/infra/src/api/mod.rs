//! Session-aware SNAPI API layer
//!
//! # Architecture
//!
//! ```text
//! ApiClient::request
//!   ├─ RequestComposer   URL, header precedence, MISSING_APP_KEY gate
//!   ├─ MutationDeduplicator   block toggles only
//!   ├─ Transport         one attempt under a deadline, response classification
//!   └─ on 401 (authenticated, not refresh, not a retry)
//!        RefreshCoordinator::refresh_once → reauthorize → one retry
//! ```
//!
//! Every failure reaching a caller is an [`ApiError`].

pub mod allowlist;
pub mod client;
pub mod commands;
pub mod dedupe;
pub mod errors;
pub mod refresh;
pub mod request;
pub mod response;
pub mod routes;
pub mod transport;

pub use allowlist::{AllowlistConfig, AllowlistSync, GatedSyncOutcome, SyncOutcome};
pub use client::{ApiClient, ApiClientBuilder};
pub use commands::{ApiCommands, MutationAck};
pub use dedupe::{MutationDeduplicator, MutationKey};
pub use errors::{ApiError, ApiErrorCategory, ErrorCode, RequestContext};
pub use refresh::RefreshCoordinator;
pub use request::{RequestBody, RequestOptions};
