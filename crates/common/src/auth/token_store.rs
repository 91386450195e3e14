//! Token store with an in-memory session mirror
//!
//! Manages the access/refresh token lifecycle:
//! - Persists both tokens in the secure store under fixed keys
//! - Mirrors them into a [`SessionState`] snapshot for synchronous reads
//! - Hydrates the snapshot from storage at startup
//!
//! The snapshot is the single shared mutable value of the client. It is
//! written only by [`TokenStore::set_tokens`], [`TokenStore::clear_tokens`]
//! and [`TokenStore::hydrate`], and each write replaces it whole.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use snapi_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use snapi_domain::{SessionState, TokenPair};
use tracing::{debug, info, instrument, warn};

use crate::storage::{SecureStore, StorageResult};

#[derive(Debug, Clone, Default)]
struct TokenMirror {
    session: SessionState,
    refresh_token: Option<String>,
}

/// Persisted token pair plus the process-wide session snapshot
pub struct TokenStore {
    store: Arc<dyn SecureStore>,
    mirror: RwLock<TokenMirror>,
    // Bumped by every set/clear so a slow hydrate cannot overwrite newer state.
    generation: AtomicU64,
}

impl TokenStore {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store, mirror: RwLock::new(TokenMirror::default()), generation: AtomicU64::new(0) }
    }

    /// Load both tokens from storage and install the resulting snapshot.
    ///
    /// Never fails: a storage error resolves to the signed-out state so
    /// startup is never blocked by the keychain.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> SessionState {
        let generation = self.generation.load(Ordering::SeqCst);

        let mirror = match self.read_persisted().await {
            Ok((access, refresh)) => TokenMirror {
                session: SessionState::from_tokens(access.as_deref(), refresh.as_deref()),
                refresh_token: refresh.filter(|r| !r.is_empty()),
            },
            Err(err) => {
                warn!(error = %err, "failed to hydrate session, treating as signed out");
                TokenMirror { session: SessionState::signed_out(), refresh_token: None }
            }
        };

        let mut current = self.mirror.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("tokens changed during hydrate, keeping newer snapshot");
            return current.session.clone();
        }
        *current = mirror;
        info!(is_authed = current.session.is_authed, "session hydrated");
        current.session.clone()
    }

    /// Current snapshot; no I/O.
    #[must_use]
    pub fn session(&self) -> SessionState {
        self.mirror.read().session.clone()
    }

    /// Persist a freshly issued token pair and update the snapshot.
    ///
    /// Call only after a successful sign-in or refresh. Storage failures are
    /// logged; the snapshot is updated regardless so the running process stays
    /// consistent with what the backend issued.
    #[instrument(skip_all)]
    pub async fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        if let Err(err) = self.store.set(ACCESS_TOKEN_KEY, access_token).await {
            warn!(error = %err, "failed to persist access token");
        }
        if let Err(err) = self.store.set(REFRESH_TOKEN_KEY, refresh_token).await {
            warn!(error = %err, "failed to persist refresh token");
        }

        let session = SessionState::from_tokens(Some(access_token), Some(refresh_token));
        let mut mirror = self.mirror.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *mirror = TokenMirror {
            session,
            refresh_token: Some(refresh_token.to_string()).filter(|r| !r.is_empty()),
        };
        info!(is_authed = mirror.session.is_authed, "tokens stored");
    }

    /// Convenience wrapper over [`TokenStore::set_tokens`].
    pub async fn set_pair(&self, pair: &TokenPair) {
        self.set_tokens(&pair.access_token, &pair.refresh_token).await;
    }

    /// Sign out: best-effort delete of both tokens, then reset the snapshot.
    #[instrument(skip(self))]
    pub async fn clear_tokens(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.store.delete(key).await {
                warn!(key, error = %err, "failed to delete token");
            }
        }

        let mut mirror = self.mirror.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *mirror = TokenMirror { session: SessionState::signed_out(), refresh_token: None };
        info!("tokens cleared (signed out)");
    }

    /// Access token for the `Authorization` header.
    ///
    /// Served from the snapshot once hydrated; before that, read from storage.
    pub async fn access_token(&self) -> Option<String> {
        {
            let mirror = self.mirror.read();
            if mirror.session.hydrated {
                return mirror.session.access_token.clone();
            }
        }
        self.read_key(ACCESS_TOKEN_KEY).await
    }

    /// Refresh token for the refresh call, same lookup rules as
    /// [`TokenStore::access_token`].
    pub async fn refresh_token(&self) -> Option<String> {
        {
            let mirror = self.mirror.read();
            if mirror.session.hydrated {
                return mirror.refresh_token.clone();
            }
        }
        self.read_key(REFRESH_TOKEN_KEY).await
    }

    async fn read_persisted(&self) -> StorageResult<(Option<String>, Option<String>)> {
        let access = self.store.get(ACCESS_TOKEN_KEY).await?;
        let refresh = self.store.get(REFRESH_TOKEN_KEY).await?;
        Ok((access, refresh))
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                warn!(key, error = %err, "failed to read token");
                None
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session();
        f.debug_struct("TokenStore")
            .field("hydrated", &session.hydrated)
            .field("is_authed", &session.is_authed)
            .finish_non_exhaustive()
    }
}
