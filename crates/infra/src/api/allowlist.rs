//! Contact allowlist sync
//!
//! Pushes a set of already-enumerated contact numbers to the allowlist
//! endpoint with bounded concurrency. A daily gate stored in the secure
//! store keeps app remounts from re-running the sync.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snapi_domain::constants::{
    ALLOWLIST_CONCURRENCY, ALLOWLIST_INTERVAL_MS, ALLOWLIST_LAST_SYNC_ATTEMPT_KEY,
    ALLOWLIST_LAST_SYNC_OK_KEY, ALLOWLIST_MAX_PER_RUN, ALLOWLIST_TIMEOUT_MS, ALLOW_PATH,
};
use snapi_domain::normalize_to_e164;
use tracing::{debug, info, instrument, warn};

use super::client::ApiClient;
use super::request::RequestOptions;

const FALLBACK_ERROR: &str = "sync_failed";

/// Tuning for [`AllowlistSync`]
#[derive(Debug, Clone)]
pub struct AllowlistConfig {
    /// Numbers pushed per run at most
    pub max_per_run: usize,
    /// Parallel requests
    pub concurrency: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// Minimum age of the last run before `sync_if_needed` runs again
    pub interval_ms: i64,
}

impl Default for AllowlistConfig {
    fn default() -> Self {
        Self {
            max_per_run: ALLOWLIST_MAX_PER_RUN,
            concurrency: ALLOWLIST_CONCURRENCY,
            timeout: Duration::from_millis(ALLOWLIST_TIMEOUT_MS),
            interval_ms: ALLOWLIST_INTERVAL_MS,
        }
    }
}

/// Result of one sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub ok: bool,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`AllowlistSync::sync_if_needed`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatedSyncOutcome {
    pub did_run: bool,
    #[serde(flatten)]
    pub outcome: Option<SyncOutcome>,
}

/// Normalise to E.164, drop unusable and duplicate numbers, keep first-seen
/// order and cap the list.
pub fn prepare_numbers<I, S>(raw: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|n| normalize_to_e164(n.as_ref()))
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .take(max)
        .collect()
}

/// Allowlist synchroniser
#[derive(Debug, Clone)]
pub struct AllowlistSync {
    client: ApiClient,
    config: AllowlistConfig,
}

impl AllowlistSync {
    pub fn new(client: ApiClient) -> Self {
        Self::with_config(client, AllowlistConfig::default())
    }

    pub fn with_config(client: ApiClient, config: AllowlistConfig) -> Self {
        Self { client, config }
    }

    /// Push `numbers` to the allowlist now
    ///
    /// # Returns
    ///
    /// `ok` with the number of accepted entries when at least one succeeded;
    /// otherwise `ok: false` with the first error seen. An empty input is a
    /// successful no-op.
    #[instrument(skip_all, fields(input = numbers.len()))]
    pub async fn sync_now(&self, numbers: &[String]) -> SyncOutcome {
        self.stamp(ALLOWLIST_LAST_SYNC_ATTEMPT_KEY).await;

        let list = prepare_numbers(numbers, self.config.max_per_run);
        if list.is_empty() {
            debug!("no allowlist numbers to sync");
            return SyncOutcome { ok: true, count: 0, error: None };
        }

        let results: Vec<Result<(), String>> = stream::iter(list)
            .map(|from| self.allow_one(from))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let ok_count = results.iter().filter(|r| r.is_ok()).count();
        let first_error = results.into_iter().find_map(Result::err);

        if ok_count > 0 {
            self.stamp(ALLOWLIST_LAST_SYNC_OK_KEY).await;
            info!(count = ok_count, "allowlist synced");
            return SyncOutcome { ok: true, count: ok_count, error: None };
        }

        let error = first_error.unwrap_or_else(|| FALLBACK_ERROR.to_string());
        warn!(%error, "allowlist sync failed");
        SyncOutcome { ok: false, count: 0, error: Some(error) }
    }

    /// Run [`AllowlistSync::sync_now`] only if the last run is older than the
    /// configured interval.
    pub async fn sync_if_needed(&self, numbers: &[String]) -> GatedSyncOutcome {
        let ok_at = self.read_stamp(ALLOWLIST_LAST_SYNC_OK_KEY).await;
        let attempt_at = self.read_stamp(ALLOWLIST_LAST_SYNC_ATTEMPT_KEY).await;
        let last_any = ok_at.max(attempt_at);
        let now = Utc::now().timestamp_millis();

        let due = last_any == 0 || now - last_any > self.config.interval_ms;
        debug!(due, last_minutes_ago = ?(last_any > 0).then(|| (now - last_any) / 60_000), "allowlist gate");
        if !due {
            return GatedSyncOutcome { did_run: false, outcome: None };
        }

        let outcome = self.sync_now(numbers).await;
        GatedSyncOutcome { did_run: true, outcome: Some(outcome) }
    }

    async fn allow_one(&self, from: String) -> Result<(), String> {
        let options = RequestOptions::post()
            .form([("from", from.as_str()), ("allow", "true")])
            .timeout(self.config.timeout)
            .quiet();

        match self.client.request(ALLOW_PATH, options).await {
            Ok(body) if body.get("ok").and_then(Value::as_bool) == Some(true) => Ok(()),
            Ok(body) => Err(body
                .get("error")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .unwrap_or(FALLBACK_ERROR)
                .to_string()),
            Err(err) => {
                let message = err.to_string();
                Err(if message.trim().is_empty() { FALLBACK_ERROR.to_string() } else { message })
            }
        }
    }

    async fn stamp(&self, key: &str) {
        let now = Utc::now().timestamp_millis().to_string();
        if let Err(err) = self.client.store().set(key, &now).await {
            warn!(key, error = %err, "failed to record allowlist timestamp");
        }
    }

    async fn read_stamp(&self, key: &str) -> i64 {
        match self.client.store().get(key).await {
            Ok(value) => value.and_then(|v| v.trim().parse().ok()).unwrap_or(0),
            Err(err) => {
                warn!(key, error = %err, "failed to read allowlist timestamp");
                0
            }
        }
    }
}
