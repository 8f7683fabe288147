//! Mapping of failed HTTP exchanges onto [`LeadflowError`].
//!
//! The server reports failures as `{ "detail": ... }`. A string detail is
//! shown verbatim; a list of validation entries (`[{ "msg": ... }]`) is joined
//! into one line. Without a usable detail the per-operation fallback message
//! is used instead.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::LeadflowError;

/// Extract the `detail` message from an error response body.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// Classify a non-success response.
///
/// 401 is an authentication failure, 404 a missing record, any other 4xx a
/// validation failure. Everything else is a generic API error.
pub fn classify_status(status: StatusCode, detail: Option<String>, fallback: String) -> LeadflowError {
    let message = detail.unwrap_or(fallback);
    match status.as_u16() {
        401 => LeadflowError::Auth(message),
        404 => LeadflowError::NotFound(message),
        400..=499 => LeadflowError::Validation(message),
        code => LeadflowError::Api {
            status: code,
            message,
        },
    }
}

/// A success response whose body could not be decoded.
///
/// The serde detail goes to the log; the caller sees the operation's fallback.
pub fn decode_error(error: &serde_json::Error, fallback: String) -> LeadflowError {
    tracing::warn!(%error, "response body could not be decoded");
    LeadflowError::Decode(fallback)
}

/// A request that never produced a response.
pub fn transport_error(error: &reqwest::Error, fallback: String) -> LeadflowError {
    if error.is_timeout() {
        tracing::warn!(%error, "request timed out");
    } else {
        tracing::warn!(%error, "request failed before a response was received");
    }
    LeadflowError::Network(fallback)
}
