//! Phone-number normalisation
//!
//! Only US numbers are handled; anything ambiguous normalises to an empty
//! string so callers can skip it.

fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalise a user-entered number to E.164.
///
/// - `+` prefixed input keeps its digits
/// - 10 digits become `+1XXXXXXXXXX`
/// - 11 digits starting with `1` become `+1XXXXXXXXXX`
/// - anything else yields an empty string
#[must_use]
pub fn normalize_to_e164(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let digits = digits_only(trimmed);
    if trimmed.starts_with('+') {
        return if digits.is_empty() { String::new() } else { format!("+{digits}") };
    }

    match digits.len() {
        10 => format!("+1{digits}"),
        11 if digits.starts_with('1') => format!("+{digits}"),
        _ => String::new(),
    }
}

/// Render an E.164 US number as `XXX-XXX-XXXX` for dialing.
///
/// Input that does not look like a US number is returned without the country
/// code but otherwise untouched.
#[must_use]
pub fn format_dial_number(e164: &str) -> String {
    let local = e164.strip_prefix("+1").unwrap_or(e164);
    let bytes = local.as_bytes();
    if bytes.len() >= 10 && bytes[..10].iter().all(u8::is_ascii_digit) {
        format!("{}-{}-{}{}", &local[..3], &local[3..6], &local[6..10], &local[10..])
    } else {
        local.to_string()
    }
}
