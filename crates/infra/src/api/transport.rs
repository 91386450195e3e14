//! One guarded network attempt

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::request::PreparedRequest;
use super::response::{app_code, error_message, is_explicit_failure, parse_body, preview};
use crate::http::HttpClient;

/// Executes prepared requests under their per-attempt deadline
#[derive(Clone)]
pub struct Transport {
    http: Arc<HttpClient>,
}

impl Transport {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Send `prepared` once and classify the outcome.
    ///
    /// The deadline covers both the send and the body read. Non-2xx responses
    /// become [`ApiError::Http`]; a 2xx carrying `ok: false` becomes
    /// [`ApiError::Application`].
    pub async fn execute(&self, prepared: &PreparedRequest) -> Result<Value, ApiError> {
        let context = prepared.context.clone();

        let mut builder = self.http.request(prepared.method.clone(), &prepared.url);
        for (name, value) in prepared.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &prepared.body {
            builder = builder.body(body.encode());
        }

        if !prepared.quiet {
            debug!(method = %prepared.method, url = %prepared.url, retry = prepared.is_retry, "api request");
        }

        let attempt = async {
            let response = self.http.send(builder).await?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, content_type, bytes))
        };

        let (status, content_type, bytes) = match tokio::time::timeout(prepared.timeout, attempt).await
        {
            Ok(Ok(parts)) => parts,
            Ok(Err(err)) => return Err(ApiError::from_transport(&err, context)),
            Err(_) => {
                return Err(ApiError::Timeout {
                    context,
                    cause: format!("no response within {:?}", prepared.timeout),
                })
            }
        };

        let body = parse_body(status, content_type.as_deref(), &bytes);

        if !prepared.quiet {
            debug!(status, url = %prepared.url, "api response");
        }

        if !(200..300).contains(&status) {
            if let Value::String(text) = &body {
                warn!(status, path = %prepared.path, body = preview(text), "non-JSON error body");
            }
            return Err(ApiError::Http {
                status,
                message: error_message(status, &body),
                app_code: app_code(&body),
                body,
                context,
            });
        }

        if is_explicit_failure(&body) {
            return Err(ApiError::Application {
                status,
                message: error_message(status, &body),
                app_code: app_code(&body),
                body,
                context,
            });
        }

        Ok(body)
    }
}
