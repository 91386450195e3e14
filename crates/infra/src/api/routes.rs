//! Route classification and URL resolution

use once_cell::sync::Lazy;
use regex::Regex;
use snapi_domain::constants::{APP_API_PREFIX, DEFAULT_BASE_URL, MOBILE_PREFIX, REFRESH_PATH};
use tracing::warn;

static MARKETING_HOST_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)(^|//)(www\.)?snapipro\.com(/|$)").ok());

/// Routes that get a bearer token and are eligible for refresh-and-retry.
pub fn is_authenticated_route(path: &str) -> bool {
    path.starts_with(MOBILE_PREFIX) || path.starts_with(APP_API_PREFIX)
}

/// Routes that refuse to run without an app key.
pub fn requires_app_key(path: &str) -> bool {
    path.starts_with(APP_API_PREFIX)
}

pub fn is_refresh_route(path: &str) -> bool {
    let bare = path.split(['?', '#']).next().unwrap_or(path);
    bare.trim_end_matches('/') == REFRESH_PATH
}

/// Substitute the canonical API host when the configured base points at the
/// marketing site.
pub fn effective_base_url(configured: &str) -> &str {
    let lowered = configured.to_ascii_lowercase();
    if lowered.contains("//api.snapipro.com") {
        return configured;
    }
    let is_marketing = MARKETING_HOST_RE.as_ref().is_some_and(|re| re.is_match(configured));
    if is_marketing {
        warn!(configured, "base URL points at the marketing host, using API host");
        DEFAULT_BASE_URL
    } else {
        configured
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
