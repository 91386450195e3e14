//! Session-aware API client
//!
//! [`ApiClient::request`] is the single entry point for backend traffic. It
//! composes headers, routes block toggles through the mutation
//! de-duplicator, executes one guarded attempt and, on a 401 from an
//! authenticated route, drives exactly one refresh-and-retry cycle.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use snapi_common::{DeviceIdentityProvider, SecureStore, TokenStore};
use snapi_domain::{ClientConfig, SessionState, SnapiError};
use tracing::{debug, info, instrument};

use super::dedupe::{parse_block_toggle, MutationDeduplicator};
use super::errors::ApiError;
use super::refresh::RefreshCoordinator;
use super::request::{AuthMode, PreparedRequest, RequestComposer, RequestOptions};
use super::routes::{is_authenticated_route, is_refresh_route};
use super::transport::Transport;
use crate::http::HttpClient;

struct ClientInner {
    config: Arc<ClientConfig>,
    store: Arc<dyn SecureStore>,
    identity: DeviceIdentityProvider,
    tokens: Arc<TokenStore>,
    composer: RequestComposer,
    transport: Transport,
    refresher: RefreshCoordinator,
    mutations: MutationDeduplicator,
}

/// API client shared by every caller of the app
///
/// Cheap to clone; all clones share the session snapshot, the refresh
/// coordinator and the mutation bookkeeping.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Execute a request and return the parsed body
    ///
    /// # Arguments
    ///
    /// * `path` - API path (e.g., "/mobile/me")
    /// * `options` - Method, headers, body and optional timeout override
    ///
    /// # Returns
    ///
    /// The parsed response body: JSON, raw text, or `Null` for empty bodies
    ///
    /// # Errors
    ///
    /// Returns a classified [`ApiError`]; never a raw transport error
    #[instrument(skip(self, options), fields(path = %path, method = %options.method))]
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        // Fails with MISSING_APP_KEY before any I/O.
        let prepared = self.inner.composer.compose(path, &options, AuthMode::Bearer).await?;

        match parse_block_toggle(path, &prepared.method, prepared.body.as_ref()) {
            Some(toggle) => {
                let key = toggle.key(&prepared.method);
                let context = prepared.context.clone();
                let inner = self.inner.clone();
                self.inner
                    .mutations
                    .run(key, context, toggle.debounced_response(), async move {
                        inner.dispatch(prepared).await
                    })
                    .await
            }
            None => self.inner.dispatch(prepared).await,
        }
    }

    /// GET `path` and decode the body into `T`
    ///
    /// # Errors
    ///
    /// Returns the request error, or [`ApiError::Application`] when the body
    /// does not decode as `T`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.request(path, RequestOptions::get()).await?;
        self.decode(path, body)
    }

    /// POST a JSON body to `path` and decode the response into `R`
    ///
    /// # Errors
    ///
    /// Returns the request error, or [`ApiError::Application`] when the body
    /// cannot be serialised or the response does not decode as `R`
    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let json = serde_json::to_value(body).map_err(|err| ApiError::Application {
            status: 0,
            message: format!("Failed to serialize body: {err}"),
            app_code: None,
            body: Value::Null,
            context: self.inner.composer.context(path),
        })?;
        let response = self.request(path, RequestOptions::post().json(json)).await?;
        self.decode(path, response)
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ApiError> {
        serde_json::from_value(body.clone()).map_err(|err| ApiError::Application {
            status: 200,
            message: format!("Failed to parse response: {err}"),
            app_code: None,
            body,
            context: self.inner.composer.context(path),
        })
    }

    /// Load persisted tokens into the session snapshot. Never fails.
    pub async fn hydrate(&self) -> SessionState {
        self.inner.tokens.hydrate().await
    }

    /// Current session snapshot; no I/O.
    pub fn session(&self) -> SessionState {
        self.inner.tokens.session()
    }

    /// Persist a freshly issued token pair (after sign-in).
    pub async fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        self.inner.tokens.set_tokens(access_token, refresh_token).await;
    }

    /// Sign out.
    pub async fn clear_tokens(&self) {
        self.inner.tokens.clear_tokens().await;
    }

    /// Persisted device id, created on first use.
    pub async fn device_id(&self) -> String {
        self.inner.identity.device_id().await
    }

    /// Force a refresh attempt, subject to single-flight and cool-down.
    pub async fn refresh_session(&self) -> bool {
        self.inner.refresher.refresh_once().await
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Effective base URL after marketing-host substitution.
    pub fn base_url(&self) -> &str {
        self.inner.composer.base_url()
    }

    /// Credential store shared with the token store.
    pub fn store(&self) -> Arc<dyn SecureStore> {
        self.inner.store.clone()
    }

    /// Token store backing the session snapshot.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.inner.tokens
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url())
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}

impl ClientInner {
    async fn dispatch(&self, prepared: PreparedRequest) -> Result<Value, ApiError> {
        let err = match self.transport.execute(&prepared).await {
            Ok(body) => return Ok(body),
            Err(err) => err,
        };

        let eligible = err.is_unauthorized()
            && !prepared.is_retry
            && is_authenticated_route(&prepared.path)
            && !is_refresh_route(&prepared.path);
        if !eligible {
            return Err(err);
        }

        debug!(path = %prepared.path, "401 on authenticated route, attempting refresh");
        if !self.refresher.refresh_once().await {
            return Err(err);
        }

        let retry = self.composer.reauthorize(prepared).await;
        self.transport.execute(&retry).await
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    store: Option<Arc<dyn SecureStore>>,
    http_client: Option<HttpClient>,
}

impl ApiClientBuilder {
    /// Set configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store (defaults to the OS keychain)
    pub fn store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a preconfigured HTTP client
    pub fn http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn build(self) -> Result<ApiClient, SnapiError> {
        let config = Arc::new(self.config.unwrap_or_default());

        let store: Arc<dyn SecureStore> = match self.store {
            Some(store) => store,
            None => Arc::new(snapi_common::KeychainSecureStore::new(config.keychain_service.clone())),
        };

        let http = match self.http_client {
            Some(http) => http,
            None => HttpClient::new()?,
        };

        let identity = DeviceIdentityProvider::new(store.clone());
        let tokens = Arc::new(TokenStore::new(store.clone()));
        let composer = RequestComposer::new(config.clone(), identity.clone(), tokens.clone());
        let transport = Transport::new(Arc::new(http));
        let refresher = RefreshCoordinator::new(
            composer.clone(),
            transport.clone(),
            tokens.clone(),
            config.refresh_cooldown(),
        );
        let mutations = MutationDeduplicator::new(config.mutation_debounce());

        info!(
            base_url = %composer.base_url(),
            app_key_len = config.app_key().map_or(0, str::len),
            app_key_prefix = config.app_key_prefix(),
            "api client configured"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config,
                store,
                identity,
                tokens,
                composer,
                transport,
                refresher,
                mutations,
            }),
        })
    }
}
