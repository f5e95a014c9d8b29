//! Mapping of provider error responses onto [`ImageGenError`]

use serde_json::Value;

use crate::error::ImageGenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Quota,
    RateLimit,
    ContentPolicy,
}

/// Lowercase substrings of provider error bodies and what they indicate
///
/// Checked in order; quota markers come first because some providers report
/// exhausted credit with a 429 status.
const MARKERS: &[(&str, Marker)] = &[
    ("insufficient_quota", Marker::Quota),
    ("billing_hard_limit", Marker::Quota),
    ("insufficient credits", Marker::Quota),
    ("insufficient_credits", Marker::Quota),
    ("exceeded your current quota", Marker::Quota),
    ("quota", Marker::Quota),
    ("rate_limit", Marker::RateLimit),
    ("rate limit", Marker::RateLimit),
    ("too many requests", Marker::RateLimit),
    ("content_policy_violation", Marker::ContentPolicy),
    ("safety system", Marker::ContentPolicy),
];

/// Classify a non-2xx provider response
pub(crate) fn classify(status: u16, body: &str) -> ImageGenError {
    let message = error_message(body).unwrap_or_else(|| format!("provider returned HTTP {status}"));
    let haystack = body.to_ascii_lowercase();

    let marker = MARKERS
        .iter()
        .find(|(needle, _)| haystack.contains(needle))
        .map(|(_, marker)| *marker)
        .or(match status {
            402 => Some(Marker::Quota),
            429 => Some(Marker::RateLimit),
            _ => None,
        });

    match marker {
        Some(Marker::Quota) => ImageGenError::QuotaExceeded { status, message },
        Some(Marker::RateLimit) => ImageGenError::RateLimited { status, message },
        Some(Marker::ContentPolicy) => ImageGenError::ContentRejected { status, message },
        None => ImageGenError::Provider {
            status: Some(status),
            message,
        },
    }
}

/// Pull the most specific human readable message out of an error body
///
/// Falls back to the raw text when the body is not JSON or has no known
/// message field.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    ["/error/message", "/message", "/error", "/detail", "/status/0/response/message"]
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .map_or_else(|| Some(trimmed.to_string()), |message| Some(message.to_string()))
}
