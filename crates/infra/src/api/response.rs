//! Defensive response parsing

use serde_json::Value;
use snapi_domain::constants::ERROR_PREVIEW_CHARS;

/// Parse a response body without ever failing.
///
/// `204` and empty bodies are `Null`. JSON content types are parsed, with a
/// malformed document also yielding `Null`. Anything else is returned as a
/// string.
pub fn parse_body(status: u16, content_type: Option<&str>, bytes: &[u8]) -> Value {
    if status == 204 || bytes.is_empty() {
        return Value::Null;
    }

    let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
    if is_json {
        serde_json::from_slice(bytes).unwrap_or(Value::Null)
    } else {
        Value::String(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Message for a non-2xx response: the body's `error` or `message` string,
/// else a generic one naming the status.
pub fn error_message(status: u16, body: &Value) -> String {
    ["error", "message"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .filter(|msg| !msg.trim().is_empty())
        .map_or_else(|| format!("Request failed ({status})"), str::to_string)
}

/// Backend-specific error code carried in the body.
pub fn app_code(body: &Value) -> Option<String> {
    body.get("code").and_then(Value::as_str).map(str::to_string)
}

/// True when a successful response still reports `ok: false`.
pub fn is_explicit_failure(body: &Value) -> bool {
    matches!(body.get("ok"), Some(Value::Bool(false)))
}

/// Truncated body text for logs.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(ERROR_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
