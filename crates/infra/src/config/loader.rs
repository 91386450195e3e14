//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Start from defaults
//! 2. Overlay the first config file found by [`probe_config_paths`]
//! 3. Overlay environment variables
//!
//! Blank values count as unset at every layer.
//!
//! ## Environment Variables
//! - `SNAPI_API_BASE_URL`, then `SNAPI_BASE_URL`: API base URL
//! - `SNAPI_APP_KEY`, then `SNAPI_MOBILE_KEY`, then `SNAPI_FALLBACK_APP_KEY`:
//!   application key
//! - `SNAPI_TIMEOUT_MS`: default per-attempt timeout
//! - `SNAPI_REFRESH_COOLDOWN_MS`: refresh cool-down window
//! - `SNAPI_MUTATION_DEBOUNCE_MS`: toggle debounce window
//! - `SNAPI_KEYCHAIN_SERVICE`: keychain service name
//!
//! ## File Locations
//! The loader probes, in the current working directory and then next to the
//! executable: `snapi.toml`, `snapi.json`, `config.toml`, `config.json`.

use std::path::{Path, PathBuf};

use snapi_domain::{ClientConfig, Result, SnapiError};

use crate::errors::InfraError;

const BASE_URL_VARS: &[&str] = &["SNAPI_API_BASE_URL", "SNAPI_BASE_URL"];
const APP_KEY_VARS: &[&str] = &["SNAPI_APP_KEY", "SNAPI_MOBILE_KEY", "SNAPI_FALLBACK_APP_KEY"];
const CONFIG_FILE_NAMES: &[&str] = &["snapi.toml", "snapi.json", "config.toml", "config.json"];

/// Load configuration: defaults, then a probed file, then the environment
///
/// # Errors
/// Returns `SnapiError::Config` if a probed file is unreadable or invalid,
/// or an environment variable holds an invalid number.
pub fn load() -> Result<ClientConfig> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("no config file found, using defaults");
            ClientConfig::default()
        }
    };

    let config = apply_env(base, |key| std::env::var(key).ok())?;
    tracing::info!(
        base_url = %config.base_url(),
        app_key_prefix = config.app_key_prefix(),
        "configuration loaded"
    );
    Ok(config)
}

/// Load configuration from defaults plus environment variables only
///
/// # Errors
/// Returns `SnapiError::Config` if a numeric variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    apply_env(ClientConfig::default(), |key| std::env::var(key).ok())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by extension (`.toml` or `.json`); missing fields take their defaults.
///
/// # Errors
/// Returns `SnapiError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SnapiError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SnapiError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(InfraError::from)?;
    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents).map_err(InfraError::from)?),
        "json" => Ok(serde_json::from_str(contents).map_err(InfraError::from)?),
        _ => Err(SnapiError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first existing file, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    probe_in(&dirs)
}

fn probe_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Overlay environment values onto `config`.
fn apply_env<F>(mut config: ClientConfig, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let first_set = |keys: &[&str]| {
        keys.iter().find_map(|key| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    };

    if let Some(base_url) = first_set(BASE_URL_VARS) {
        config.base_url = base_url;
    }
    if let Some(app_key) = first_set(APP_KEY_VARS) {
        config.app_key = Some(app_key);
    }
    if let Some(service) = first_set(&["SNAPI_KEYCHAIN_SERVICE"]) {
        config.keychain_service = service;
    }
    if let Some(ms) = first_set(&["SNAPI_TIMEOUT_MS"]) {
        config.timeout_ms = parse_ms("SNAPI_TIMEOUT_MS", &ms)?;
    }
    if let Some(ms) = first_set(&["SNAPI_REFRESH_COOLDOWN_MS"]) {
        config.refresh_cooldown_ms = parse_ms("SNAPI_REFRESH_COOLDOWN_MS", &ms)?;
    }
    if let Some(ms) = first_set(&["SNAPI_MUTATION_DEBOUNCE_MS"]) {
        config.mutation_debounce_ms = parse_ms("SNAPI_MUTATION_DEBOUNCE_MS", &ms)?;
    }

    Ok(config)
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|e| SnapiError::Config(format!("Invalid {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use snapi_domain::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
    use tempfile::{Builder, TempDir};

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_with_fallback_order() {
        let config = apply_env(
            ClientConfig::default(),
            lookup_from(&[
                ("SNAPI_API_BASE_URL", "  "),
                ("SNAPI_BASE_URL", "https://staging.example"),
                ("SNAPI_MOBILE_KEY", "mob123"),
                ("SNAPI_FALLBACK_APP_KEY", "fallback"),
                ("SNAPI_TIMEOUT_MS", "5000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://staging.example");
        assert_eq!(config.app_key.as_deref(), Some("mob123"));
        assert_eq!(config.timeout_ms, 5000);
    }

    #[test]
    fn empty_env_keeps_defaults() {
        let config = apply_env(ClientConfig::default(), lookup_from(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn invalid_number_is_config_error() {
        let err = apply_env(ClientConfig::default(), lookup_from(&[("SNAPI_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, SnapiError::Config(msg) if msg.contains("SNAPI_TIMEOUT_MS")));
    }

    #[test]
    fn load_from_env_reads_process_environment() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("SNAPI_APP_KEY", "envkey");
        std::env::set_var("SNAPI_REFRESH_COOLDOWN_MS", "250");

        let config = load_from_env().unwrap();
        assert_eq!(config.app_key(), Some("envkey"));
        assert_eq!(config.refresh_cooldown_ms, 250);

        std::env::remove_var("SNAPI_APP_KEY");
        std::env::remove_var("SNAPI_REFRESH_COOLDOWN_MS");
    }

    #[test]
    fn load_from_file_toml_with_partial_fields() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"https://api.example.test\"\napp_key = \"abc\"").unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.base_url, "https://api.example.test");
        assert_eq!(config.app_key(), Some("abc"));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn load_from_file_json() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"base_url": "https://j.example", "mutation_debounce_ms": 100}}"#).unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.base_url, "https://j.example");
        assert_eq!(config.mutation_debounce_ms, 100);
    }

    #[test]
    fn load_from_file_rejects_bad_input() {
        let missing = load_from_file(Some(PathBuf::from("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(missing, SnapiError::Config(msg) if msg.contains("not found")));

        let mut bad = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(bad, "base_url = [").unwrap();
        let invalid = load_from_file(Some(bad.path().to_path_buf())).unwrap_err();
        assert!(matches!(invalid, SnapiError::Config(msg) if msg.contains("TOML")));

        let mut yaml = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "base_url: x").unwrap();
        let unsupported = load_from_file(Some(yaml.path().to_path_buf())).unwrap_err();
        assert!(matches!(unsupported, SnapiError::Config(msg) if msg.contains("Unsupported")));
    }

    #[test]
    fn probe_prefers_snapi_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        assert_eq!(probe_in(&[dir.path().to_path_buf()]), Some(dir.path().join("config.json")));

        std::fs::write(dir.path().join("snapi.toml"), "").unwrap();
        assert_eq!(probe_in(&[dir.path().to_path_buf()]), Some(dir.path().join("snapi.toml")));

        let empty = TempDir::new().unwrap();
        assert_eq!(probe_in(&[empty.path().to_path_buf()]), None);
    }
}
