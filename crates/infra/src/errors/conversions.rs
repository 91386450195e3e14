//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use snapi_domain::SnapiError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SnapiError);

impl From<InfraError> for SnapiError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SnapiError> for InfraError {
    fn from(value: SnapiError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SnapiError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_builder() {
            return InfraError(SnapiError::Config(format!("invalid HTTP client setup: {value}")));
        }

        if value.is_timeout() {
            return InfraError(SnapiError::Network("HTTP request timed out".into()));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if value.is_connect() {
            return InfraError(SnapiError::Network("HTTP connection failure".into()));
        }

        InfraError(SnapiError::Network(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* config parsing → SnapiError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(SnapiError::Config(format!("invalid TOML config: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(SnapiError::Config(format!("invalid JSON config: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(SnapiError::Config(format!("failed to read config file: {value}")))
    }
}
