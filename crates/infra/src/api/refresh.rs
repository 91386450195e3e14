//! Single-flight token refresh
//!
//! Concurrent callers that hit a 401 share one refresh attempt. After an
//! attempt settles, further calls inside the cool-down window return `false`
//! without touching the network so a burst of 401s cannot hammer the
//! refresh endpoint.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::{json, Value};
use snapi_common::TokenStore;
use snapi_domain::constants::REFRESH_PATH;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::request::{AuthMode, RequestComposer, RequestOptions};
use super::transport::Transport;

type RefreshFuture = Shared<BoxFuture<'static, bool>>;

const ACCESS_TOKEN_PATHS: &[&[&str]] =
    &[&["accessToken"], &["access_token"], &["token"], &["access"], &["session", "accessToken"]];
const REFRESH_TOKEN_PATHS: &[&[&str]] =
    &[&["refreshToken"], &["refresh_token"], &["refresh"], &["session", "refreshToken"]];

fn lookup<'a>(body: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths.iter().find_map(|path| {
        path.iter()
            .try_fold(body, |node, key| node.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    })
}

/// Pull the new access token (required) and rotated refresh token
/// (optional) out of a refresh response.
pub fn extract_token_pair(body: &Value) -> Option<(String, Option<String>)> {
    let access = lookup(body, ACCESS_TOKEN_PATHS)?;
    let refresh = lookup(body, REFRESH_TOKEN_PATHS);
    Some((access.to_string(), refresh.map(str::to_string)))
}

#[derive(Default)]
struct RefreshState {
    in_flight: Option<RefreshFuture>,
    last_attempt_at: Option<Instant>,
}

struct RefreshInner {
    composer: RequestComposer,
    transport: Transport,
    tokens: Arc<TokenStore>,
    cooldown: Duration,
    state: Mutex<RefreshState>,
}

/// Coordinates refresh attempts across every request of a client
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<RefreshInner>,
}

impl RefreshCoordinator {
    pub fn new(
        composer: RequestComposer,
        transport: Transport,
        tokens: Arc<TokenStore>,
        cooldown: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(RefreshInner {
                composer,
                transport,
                tokens,
                cooldown,
                state: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// Refresh the session at most once for any set of overlapping callers.
    ///
    /// Returns `true` when new tokens were persisted. Never fails; every
    /// problem resolves to `false`.
    pub async fn refresh_once(&self) -> bool {
        let shared = {
            let mut state = self.inner.state.lock();

            if let Some(in_flight) = &state.in_flight {
                debug!("joining in-flight refresh");
                in_flight.clone()
            } else {
                if let Some(last) = state.last_attempt_at {
                    if last.elapsed() < self.inner.cooldown {
                        debug!("refresh suppressed by cool-down");
                        return false;
                    }
                }

                let inner = self.inner.clone();
                let task = tokio::spawn(async move {
                    let refreshed = inner.perform().await;
                    let mut state = inner.state.lock();
                    state.in_flight = None;
                    state.last_attempt_at = Some(Instant::now());
                    refreshed
                });
                // A panicked task counts as a failed refresh.
                let shared = task.map(|joined| joined.unwrap_or(false)).boxed().shared();
                state.in_flight = Some(shared.clone());
                shared
            }
        };

        shared.await
    }
}

impl RefreshInner {
    #[instrument(skip(self))]
    async fn perform(&self) -> bool {
        let Some(refresh_token) = self.tokens.refresh_token().await else {
            debug!("no refresh token, skipping refresh");
            return false;
        };

        let options = RequestOptions::post().json(json!({ "refreshToken": refresh_token })).quiet();
        let prepared = match self.composer.compose(REFRESH_PATH, &options, AuthMode::None).await {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(error = %err, "could not build refresh request");
                return false;
            }
        };

        let body = match self.transport.execute(&prepared).await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "session refresh failed");
                return false;
            }
        };

        let Some((access, rotated)) = extract_token_pair(&body) else {
            warn!("refresh response carried no access token");
            return false;
        };

        let refresh = rotated.unwrap_or(refresh_token);
        self.tokens.set_tokens(&access, &refresh).await;
        info!("session refreshed");
        true
    }
}
