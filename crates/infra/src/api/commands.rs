//! Typed call-screening commands
//!
//! High-level operations over [`ApiClient::request`]: block or allow a
//! caller and read the recent-calls feed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use snapi_domain::constants::{ALLOW_PATH, BLOCK_PATH, RECENT_PATH};
use snapi_domain::RecentCall;
use tracing::{debug, instrument, warn};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::RequestOptions;

/// Acknowledgement of a block/allow mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub ok: Option<bool>,
    /// Set when a repeated toggle was absorbed without contacting the server
    #[serde(default)]
    pub debounced: bool,
}

impl MutationAck {
    fn from_body(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }
}

/// Extract recent-call records from either `{items: [...]}` or a bare array.
///
/// Entries that do not decode are skipped.
pub fn recent_items(body: &Value) -> Vec<RecentCall> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(call) => Some(call),
            Err(err) => {
                warn!(error = %err, "skipping undecodable recent call");
                None
            }
        })
        .collect()
}

/// API commands for call screening
#[derive(Debug, Clone)]
pub struct ApiCommands {
    client: ApiClient,
}

impl ApiCommands {
    /// Create a new commands instance
    ///
    /// # Arguments
    ///
    /// * `client` - API client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Block or unblock a caller
    ///
    /// Repeats of the same state within the debounce window are absorbed.
    ///
    /// # Arguments
    ///
    /// * `from` - Caller number in E.164 form
    /// * `blocked` - Target block state
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    #[instrument(skip(self))]
    pub async fn set_blocked(&self, from: &str, blocked: bool) -> Result<MutationAck, ApiError> {
        let body = self
            .client
            .request(BLOCK_PATH, RequestOptions::post().json(json!({ "from": from, "blocked": blocked })))
            .await?;

        let ack = MutationAck::from_body(&body);
        debug!(debounced = ack.debounced, "block state updated");
        Ok(ack)
    }

    /// Add or remove a caller from the allowlist
    ///
    /// # Arguments
    ///
    /// * `from` - Caller number in E.164 form
    /// * `allowed` - Target allow state
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    #[instrument(skip(self))]
    pub async fn set_allowed(&self, from: &str, allowed: bool) -> Result<MutationAck, ApiError> {
        let options = RequestOptions::post().form([("from", from), ("allow", bool_str(allowed))]);
        let body = self.client.request(ALLOW_PATH, options).await?;
        Ok(MutationAck::from_body(&body))
    }

    /// Fetch the most recent calls
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of records
    ///
    /// # Returns
    ///
    /// Decoded call records; malformed entries are dropped
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    #[instrument(skip(self))]
    pub async fn fetch_recent(&self, limit: usize) -> Result<Vec<RecentCall>, ApiError> {
        let path = format!("{RECENT_PATH}?limit={limit}");
        let body = self.client.request(&path, RequestOptions::get()).await?;

        let calls = recent_items(&body);
        debug!(count = calls.len(), "fetched recent calls");
        Ok(calls)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_items_accepts_both_shapes() {
        let record = json!({"ts": "t", "callSid": "CA1", "from": "+1"});

        assert_eq!(recent_items(&json!({"items": [record.clone()]})).len(), 1);
        assert_eq!(recent_items(&json!([record])).len(), 1);
        assert!(recent_items(&json!({"items": "nope"})).is_empty());
        assert!(recent_items(&Value::Null).is_empty());
    }

    #[test]
    fn recent_items_skips_malformed_entries() {
        let body = json!([{"ts": "t", "callSid": "CA1", "from": "+1"}, {"callSid": 5}, 7]);
        let calls = recent_items(&body);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].call_sid, "CA1");
    }

    #[test]
    fn ack_tolerates_any_body() {
        assert_eq!(MutationAck::from_body(&Value::Null), MutationAck::default());
        assert_eq!(
            MutationAck::from_body(&json!({"ok": true, "debounced": true, "from": "+1"})),
            MutationAck { ok: Some(true), debounced: true }
        );
    }
}
