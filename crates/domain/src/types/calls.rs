//! Call-history records returned by the admin API

use serde::{Deserialize, Serialize};

/// One entry of the recent-calls feed.
///
/// The backend adds optional block markers depending on deployment, so every
/// field except the identifiers is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCall {
    pub ts: String,
    pub call_sid: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_status: Option<String>,
}

impl RecentCall {
    /// Whether any of the backend's block markers says the caller is blocked.
    #[must_use]
    pub fn is_caller_blocked(&self) -> bool {
        self.is_blocked.unwrap_or(false)
            || self.blocked.unwrap_or(false)
            || self.block_status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("blocked"))
    }
}
