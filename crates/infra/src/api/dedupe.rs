//! Mutation de-duplication
//!
//! Absorbs accidental double-taps on state toggles. A repeat of the same
//! target state for the same resource inside the debounce window returns a
//! synthetic success; an identical request still in flight is joined rather
//! than re-sent. A reversal (block then unblock) always goes through.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::Value;
use snapi_domain::constants::BLOCK_PATH;
use tokio::time::Instant;
use tracing::debug;

use super::errors::{ApiError, RequestContext};
use super::request::RequestBody;

type SharedResult = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Identity of one toggle request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutationKey {
    pub operation: String,
    pub resource: String,
    pub target_state: bool,
}

/// A recognised block toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleMutation {
    pub from: String,
    pub blocked: bool,
}

impl ToggleMutation {
    pub fn key(&self, method: &Method) -> MutationKey {
        MutationKey {
            operation: method.as_str().to_string(),
            resource: self.from.clone(),
            target_state: self.blocked,
        }
    }

    /// Synthetic response returned for a suppressed repeat.
    pub fn debounced_response(&self) -> Value {
        serde_json::json!({
            "ok": true,
            "debounced": true,
            "from": self.from,
            "blocked": self.blocked,
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// Recognise `POST /app/api/block` with a `from` and `blocked` field.
///
/// A blank `from` is not a toggle and bypasses de-duplication.
pub fn parse_block_toggle(
    path: &str,
    method: &Method,
    body: Option<&RequestBody>,
) -> Option<ToggleMutation> {
    if *method != Method::POST {
        return None;
    }
    let bare = path.split('?').next().unwrap_or(path);
    if bare.trim_end_matches('/') != BLOCK_PATH {
        return None;
    }

    let body = body?;
    let from = body.field("from")?;
    let from = from.as_str()?.trim();
    if from.is_empty() {
        return None;
    }
    let blocked = body.field("blocked").is_some_and(|v| is_truthy(&v));

    Some(ToggleMutation { from: from.to_string(), blocked })
}

#[derive(Debug, Clone, Copy)]
struct Applied {
    at: Instant,
    target_state: bool,
}

#[derive(Default)]
struct DedupState {
    in_flight: HashMap<MutationKey, SharedResult>,
    last_applied: HashMap<String, Applied>,
}

/// Debounces and joins toggle mutations
#[derive(Clone)]
pub struct MutationDeduplicator {
    window: Duration,
    state: Arc<Mutex<DedupState>>,
}

impl MutationDeduplicator {
    pub fn new(window: Duration) -> Self {
        Self { window, state: Arc::new(Mutex::new(DedupState::default())) }
    }

    /// Run `op` for `key` unless it is a debounced repeat or already in flight.
    pub async fn run<F>(
        &self,
        key: MutationKey,
        context: RequestContext,
        debounced: Value,
        op: F,
    ) -> Result<Value, ApiError>
    where
        F: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let shared = {
            let mut state = self.state.lock();
            let now = Instant::now();
            let window = self.window;
            state.last_applied.retain(|_, applied| now.duration_since(applied.at) < window);

            if let Some(applied) = state.last_applied.get(&key.resource) {
                if applied.target_state == key.target_state {
                    debug!(resource = %key.resource, "mutation debounced");
                    return Ok(debounced);
                }
            }

            state
                .last_applied
                .insert(key.resource.clone(), Applied { at: now, target_state: key.target_state });

            if let Some(in_flight) = state.in_flight.get(&key) {
                debug!(resource = %key.resource, "joining in-flight mutation");
                in_flight.clone()
            } else {
                let shared = self.spawn(key.clone(), now, context, op);
                state.in_flight.insert(key, shared.clone());
                shared
            }
        };

        shared.await
    }

    fn spawn<F>(
        &self,
        key: MutationKey,
        stamp: Instant,
        context: RequestContext,
        op: F,
    ) -> SharedResult
    where
        F: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let state = self.state.clone();
        let task = tokio::spawn(async move {
            let result = op.await;
            let mut guard = state.lock();
            guard.in_flight.remove(&key);
            if result.is_err() {
                // Joiners re-stamp the entry, so match on state and age, not the exact stamp.
                let ours = guard
                    .last_applied
                    .get(&key.resource)
                    .is_some_and(|a| a.target_state == key.target_state && a.at >= stamp);
                if ours {
                    guard.last_applied.remove(&key.resource);
                }
            }
            result
        });

        task.map(move |joined| {
            joined.unwrap_or_else(|err| Err(ApiError::Network { context, cause: err.to_string() }))
        })
        .boxed()
        .shared()
    }

    /// Number of mutations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }
}
