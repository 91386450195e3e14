//! Classified API errors
//!
//! Every failure that leaves [`super::ApiClient::request`] is one of these.
//! Presentation code matches on [`ApiError::code`] / [`ApiError::status`]
//! rather than on message text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// User-facing message for an attempt that hit its deadline.
pub const TIMEOUT_MESSAGE: &str = "Server not reachable. Please try again.";
/// User-facing message for any other transport failure.
pub const NETWORK_MESSAGE: &str = "Network error. Check connectivity and try again.";
/// User-facing message when the app-key gated prefix is hit without a key.
pub const MISSING_APP_KEY_MESSAGE: &str = "App key missing (SNAPI_APP_KEY).";

/// Where a request was headed when it failed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub path: String,
    pub url: String,
    pub base_url: String,
}

/// Machine-readable codes for the non-HTTP failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingAppKey,
    NetworkError,
    Timeout,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingAppKey => "MISSING_APP_KEY",
            Self::NetworkError => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Deployment misconfiguration; fails before any I/O, never retried
    Configuration,
    /// Timeout or unreachable network
    Transport,
    /// Non-2xx response or explicit `ok: false` payload
    Application,
}

/// API operation errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{}", MISSING_APP_KEY_MESSAGE)]
    MissingAppKey { context: RequestContext },

    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout { context: RequestContext, cause: String },

    #[error("{}", NETWORK_MESSAGE)]
    Network { context: RequestContext, cause: String },

    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        app_code: Option<String>,
        body: Value,
        context: RequestContext,
    },

    #[error("{message}")]
    Application {
        status: u16,
        message: String,
        app_code: Option<String>,
        body: Value,
        context: RequestContext,
    },
}

impl ApiError {
    /// Classify a reqwest failure. Anything that looks like a deadline or an
    /// abort is a timeout; everything else is a network error.
    pub fn from_transport(err: &reqwest::Error, context: RequestContext) -> Self {
        let cause = err.to_string();
        let lowered = cause.to_ascii_lowercase();
        if err.is_timeout() || lowered.contains("timeout") || lowered.contains("aborted") {
            Self::Timeout { context, cause }
        } else {
            Self::Network { context, cause }
        }
    }

    /// Taxonomy code; absent for HTTP and application failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::MissingAppKey { .. } => Some(ErrorCode::MissingAppKey),
            Self::Timeout { .. } => Some(ErrorCode::Timeout),
            Self::Network { .. } => Some(ErrorCode::NetworkError),
            Self::Http { .. } | Self::Application { .. } => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed response body, when the server answered.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } | Self::Application { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The backend's own `code` field, if the body carried one.
    pub fn app_code(&self) -> Option<&str> {
        match self {
            Self::Http { app_code, .. } | Self::Application { app_code, .. } => {
                app_code.as_deref()
            }
            _ => None,
        }
    }

    pub fn context(&self) -> &RequestContext {
        match self {
            Self::MissingAppKey { context }
            | Self::Timeout { context, .. }
            | Self::Network { context, .. }
            | Self::Http { context, .. }
            | Self::Application { context, .. } => context,
        }
    }

    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::MissingAppKey { .. } => ApiErrorCategory::Configuration,
            Self::Timeout { .. } | Self::Network { .. } => ApiErrorCategory::Transport,
            Self::Http { .. } | Self::Application { .. } => ApiErrorCategory::Application,
        }
    }

    /// A 401 from the server (not an `ok:false` payload).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }
}
