//! Shared utility functions.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Current time as Unix seconds (UTC).
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Interpret a client-supplied timestamp: Unix seconds, Unix milliseconds
/// (as sent by `Date.now()`), or an RFC 3339 string.
pub fn parse_client_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            let raw = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            // Anything past year 5138 in seconds is a millisecond value
            if raw > 100_000_000_000 {
                Some(raw / 1000)
            } else {
                Some(raw)
            }
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc).timestamp()),
        _ => None,
    }
}
