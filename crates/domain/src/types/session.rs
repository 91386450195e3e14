//! Session and credential values

use serde::{Deserialize, Serialize};

/// Access/refresh token pair as persisted in the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }

    /// Authenticated only when both halves are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

/// Snapshot of the process-wide session, read by presentation code to gate
/// navigation.
///
/// Only the token store constructs and replaces this value; everyone else
/// receives copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub hydrated: bool,
    pub is_authed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl SessionState {
    /// State before `hydrate()` has completed.
    #[must_use]
    pub const fn initial() -> Self {
        Self { hydrated: false, is_authed: false, access_token: None }
    }

    /// Hydrated, signed-out state.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { hydrated: true, is_authed: false, access_token: None }
    }

    /// Hydrated state computed from whatever tokens are present.
    #[must_use]
    pub fn from_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let access = access.filter(|value| !value.is_empty());
        let refresh = refresh.filter(|value| !value.is_empty());
        Self {
            hydrated: true,
            is_authed: access.is_some() && refresh.is_some(),
            access_token: access.map(str::to_string),
        }
    }
}
