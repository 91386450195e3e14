//! Wire and storage constants
//!
//! The backend contract is fixed; these values must not drift from what the
//! server expects.

/// Canonical API host used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.snapipro.com";

/// Marketing site host; never a valid API base.
pub const MARKETING_HOST: &str = "snapipro.com";

// Storage keys
pub const DEVICE_ID_KEY: &str = "snapi.device.id.v1";
pub const ACCESS_TOKEN_KEY: &str = "snapi_access_token";
pub const REFRESH_TOKEN_KEY: &str = "snapi_refresh_token";
pub const ALLOWLIST_LAST_SYNC_OK_KEY: &str = "snapi_allowlist_last_sync_ok_v1";
pub const ALLOWLIST_LAST_SYNC_ATTEMPT_KEY: &str = "snapi_allowlist_last_sync_attempt_v1";

/// Prefix of generated device identifiers.
pub const DEVICE_ID_PREFIX: &str = "snapi";

// Headers. Both device headers carry the same value; the server reads either.
pub const HEADER_DEVICE_ID: &str = "x-snapi-device-id";
pub const HEADER_DEVICE: &str = "x-snapi-device";
pub const HEADER_APP_KEY: &str = "x-snapi-app-key";

// Routes
pub const MOBILE_PREFIX: &str = "/mobile/";
pub const APP_API_PREFIX: &str = "/app/api/";
pub const REFRESH_PATH: &str = "/mobile/auth/refresh";
pub const BLOCK_PATH: &str = "/app/api/block";
pub const ALLOW_PATH: &str = "/app/api/allow";
pub const RECENT_PATH: &str = "/admin/api/recent";

// Timing
pub const DEFAULT_TIMEOUT_MS: u64 = 12_000;
pub const REFRESH_COOLDOWN_MS: u64 = 1_500;
pub const MUTATION_DEBOUNCE_MS: u64 = 800;

// Allowlist sync
pub const ALLOWLIST_MAX_PER_RUN: usize = 400;
pub const ALLOWLIST_CONCURRENCY: usize = 3;
pub const ALLOWLIST_TIMEOUT_MS: u64 = 15_000;
pub const ALLOWLIST_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// Error bodies longer than this are truncated in logs.
pub const ERROR_PREVIEW_CHARS: usize = 1200;

/// Keychain service name for persisted credentials.
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "SNAPI.mobile";
