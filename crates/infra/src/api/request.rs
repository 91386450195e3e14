//! Request composition
//!
//! Turns a path plus caller options into a [`PreparedRequest`] with the
//! final URL and header set. Header precedence, lowest to highest:
//!
//! 1. caller headers (any container shape, normalised)
//! 2. `Accept` / `Content-Type` defaults
//! 3. forced device headers
//! 4. app key
//! 5. bearer token on authenticated routes

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use snapi_common::{DeviceIdentityProvider, TokenStore};
use snapi_domain::constants::{HEADER_APP_KEY, HEADER_DEVICE, HEADER_DEVICE_ID};
use snapi_domain::ClientConfig;

use super::errors::{ApiError, RequestContext};
use super::routes::{effective_base_url, is_authenticated_route, join_url, requires_app_key};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";
const AUTHORIZATION: &str = "Authorization";

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialised as JSON
    Json(Value),
    /// URL-encoded as `k=v&k2=v2`
    Form(Vec<(String, String)>),
    /// Sent as-is
    Text(String),
}

impl RequestBody {
    /// Content type used when the caller sets none.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            Self::Json(_) | Self::Text(_) => JSON_CONTENT_TYPE,
            Self::Form(_) => FORM_CONTENT_TYPE,
        }
    }

    /// Wire bytes for this body.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Form(pairs) => pairs
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
                .into_bytes(),
            Self::Text(text) => text.clone().into_bytes(),
        }
    }

    /// Look up a field by name in a JSON object or form body.
    pub fn field(&self, name: &str) -> Option<Value> {
        match self {
            Self::Json(Value::Object(map)) => map.get(name).cloned(),
            Self::Form(pairs) => {
                pairs.iter().rev().find(|(k, _)| k == name).map(|(_, v)| Value::String(v.clone()))
            }
            _ => None,
        }
    }
}

/// Caller-supplied options for [`super::ApiClient::request`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method, `GET` by default
    pub method: Method,
    /// Caller headers; identity and auth headers override these
    pub headers: Vec<(String, String)>,
    /// Optional payload
    pub body: Option<RequestBody>,
    /// Overrides the configured per-attempt timeout
    pub timeout: Option<Duration>,
    /// Suppress per-request debug logging
    pub quiet: bool,
}

impl RequestOptions {
    /// Options for a `GET` request.
    pub fn get() -> Self {
        Self::default()
    }

    /// Options for a `POST` request.
    pub fn post() -> Self {
        Self { method: Method::POST, ..Self::default() }
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add headers from any map or list of pairs.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add headers from a reqwest [`HeaderMap`]; non-UTF-8 values are skipped.
    pub fn header_map(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            if let Ok(value) = value.to_str() {
                self.headers.push((name.as_str().to_string(), value.to_string()));
            }
        }
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a URL-encoded form body.
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body =
            Some(RequestBody::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()));
        self
    }

    /// Attach a plain-text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Override the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Suppress per-request debug logging.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

/// Flat header list with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// Normalise caller headers; a later duplicate (any casing) wins.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        let mut set = Self::default();
        for (name, value) in pairs {
            set.set(name, value);
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace every casing of `name` with a single entry.
    pub fn set(&mut self, name: &str, value: &str) {
        self.remove(name);
        self.entries.push((name.to_string(), value.to_string()));
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a composed request may carry a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Bearer,
    /// Refresh calls authenticate with the refresh token in the body
    None,
}

/// A fully resolved request, ready for [`super::transport::Transport`]
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub headers: HeaderSet,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
    pub quiet: bool,
    pub context: RequestContext,
    /// Set on the single post-refresh retry
    pub is_retry: bool,
}

/// Builds [`PreparedRequest`]s from config, device identity and tokens
#[derive(Clone)]
pub struct RequestComposer {
    config: Arc<ClientConfig>,
    identity: DeviceIdentityProvider,
    tokens: Arc<TokenStore>,
}

impl RequestComposer {
    pub fn new(
        config: Arc<ClientConfig>,
        identity: DeviceIdentityProvider,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self { config, identity, tokens }
    }

    pub fn base_url(&self) -> &str {
        effective_base_url(self.config.base_url())
    }

    pub fn context(&self, path: &str) -> RequestContext {
        let base_url = self.base_url();
        RequestContext {
            path: path.to_string(),
            url: join_url(base_url, path),
            base_url: base_url.to_string(),
        }
    }

    /// Fail before any I/O when the deployment is misconfigured.
    pub fn check_preconditions(&self, path: &str) -> Result<(), ApiError> {
        if requires_app_key(path) && self.config.app_key().is_none() {
            return Err(ApiError::MissingAppKey { context: self.context(path) });
        }
        Ok(())
    }

    pub async fn compose(
        &self,
        path: &str,
        options: &RequestOptions,
        auth: AuthMode,
    ) -> Result<PreparedRequest, ApiError> {
        self.check_preconditions(path)?;
        let context = self.context(path);

        let mut headers = HeaderSet::from_pairs(&options.headers);

        if !headers.contains(ACCEPT) {
            headers.set(ACCEPT, JSON_CONTENT_TYPE);
        }

        match (&options.body, headers.get(CONTENT_TYPE).map(str::to_string)) {
            (_, Some(existing)) => headers.set(CONTENT_TYPE, &existing),
            (Some(body), None) => headers.set(CONTENT_TYPE, body.default_content_type()),
            (None, None) => {}
        }

        let device_id = self.identity.device_id().await;
        headers.set(HEADER_DEVICE_ID, &device_id);
        headers.set(HEADER_DEVICE, &device_id);

        if let Some(key) = self.config.app_key() {
            headers.set(HEADER_APP_KEY, key);
        }

        if auth == AuthMode::Bearer && is_authenticated_route(path) {
            if let Some(token) = self.tokens.access_token().await {
                headers.set(AUTHORIZATION, &format!("Bearer {token}"));
            }
        }

        Ok(PreparedRequest {
            method: options.method.clone(),
            url: context.url.clone(),
            path: path.to_string(),
            headers,
            body: options.body.clone(),
            timeout: options.timeout.unwrap_or_else(|| self.config.timeout()),
            quiet: options.quiet,
            context,
            is_retry: false,
        })
    }

    /// Rebuild the credentials of `prepared` for the one post-refresh retry.
    ///
    /// Any caller-supplied `Authorization` is dropped in favour of the token
    /// the refresh just persisted.
    pub async fn reauthorize(&self, mut prepared: PreparedRequest) -> PreparedRequest {
        prepared.headers.remove(AUTHORIZATION);
        if let Some(token) = self.tokens.access_token().await {
            prepared.headers.set(AUTHORIZATION, &format!("Bearer {token}"));
        }
        prepared.is_retry = true;
        prepared
    }
}
