//! Configuration loading
//!
//! Builds a [`snapi_domain::ClientConfig`] from environment variables and
//! optional config files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
