//! Logging setup built on `tracing-subscriber`.
//!
//! Filter directives come from `SNAPI_LOG`, then `RUST_LOG`, defaulting to
//! `info`. Safe to call more than once; only the first call installs.

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const SNAPI_LOG_ENV_VAR: &str = "SNAPI_LOG";
const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber. `json` switches to structured JSON lines.
pub fn init(json: bool) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (filter, directives) = env_filter();

        let installed = if json {
            Registry::default()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            Registry::default()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(std::io::stderr().is_terminal()),
                )
                .try_init()
        };

        if installed.is_ok() {
            tracing::info!(directives = %directives, "logging initialised");
        }
    });
}

/// Resolve the filter directives, falling back to `info` on invalid input.
fn env_filter() -> (EnvFilter, String) {
    let directives = resolve_directives(|key| std::env::var(key).ok());
    match EnvFilter::try_new(&directives) {
        Ok(filter) => (filter, directives),
        Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVES), DEFAULT_DIRECTIVES.to_string()),
    }
}

fn resolve_directives<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [SNAPI_LOG_ENV_VAR, EnvFilter::DEFAULT_ENV]
        .iter()
        .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}
