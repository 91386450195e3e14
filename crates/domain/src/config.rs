//! Client configuration
//!
//! Loaded by `snapi_infra::config`; every field has a default so a partial
//! file or environment still yields a usable client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_TIMEOUT_MS, MUTATION_DEBOUNCE_MS,
    REFRESH_COOLDOWN_MS,
};

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL for the API (e.g., "https://api.snapipro.com")
    pub base_url: String,
    /// Application key sent on every request and required for `/app/api/*`
    pub app_key: Option<String>,
    /// Default per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Minimum gap between two refresh attempts in milliseconds
    pub refresh_cooldown_ms: u64,
    /// Window in which a repeated identical mutation is suppressed
    pub mutation_debounce_ms: u64,
    /// Keychain service name used for persisted credentials
    pub keychain_service: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            refresh_cooldown_ms: REFRESH_COOLDOWN_MS,
            mutation_debounce_ms: MUTATION_DEBOUNCE_MS,
            keychain_service: DEFAULT_KEYCHAIN_SERVICE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given base URL and app key, defaults elsewhere.
    pub fn new(base_url: impl Into<String>, app_key: Option<String>) -> Self {
        Self { base_url: base_url.into(), app_key, ..Self::default() }
    }

    /// Trimmed base URL, falling back to the default host when blank.
    #[must_use]
    pub fn base_url(&self) -> &str {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            DEFAULT_BASE_URL
        } else {
            trimmed
        }
    }

    /// The app key, if one is configured and non-blank.
    #[must_use]
    pub fn app_key(&self) -> Option<&str> {
        self.app_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    /// First three characters of the app key, safe to log.
    #[must_use]
    pub fn app_key_prefix(&self) -> &str {
        match self.app_key() {
            Some(key) => key.char_indices().nth(3).map_or(key, |(idx, _)| &key[..idx]),
            None => "(none)",
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn refresh_cooldown(&self) -> Duration {
        Duration::from_millis(self.refresh_cooldown_ms)
    }

    pub fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }
}
