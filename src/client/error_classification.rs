//! Error classification logic for non-2xx endpoint replies.

use serde::Deserialize;

use crate::Error;

/// Standard error class for an HTTP status.
pub(crate) fn class_for_status(status: u16) -> &'static str {
    match status {
        400 | 422 => "invalid_request",
        401 => "authentication",
        403 => "permission_denied",
        404 => "not_found",
        408 => "timeout",
        409 => "conflict",
        413 => "request_too_large",
        429 => "rate_limited",
        503 | 529 => "overloaded",
        500..=599 => "server_error",
        _ => "unknown",
    }
}

/// Transient classes a caller may choose to retry. Nothing in this crate retries.
pub(crate) fn is_retryable_class(error_class: &str) -> bool {
    matches!(
        error_class,
        "rate_limited" | "overloaded" | "server_error" | "timeout" | "conflict"
    )
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Build an [`Error::Remote`] from a failed reply.
///
/// OpenAI-style `{"error": {...}}` bodies supply the message; a few provider
/// codes refine the status-derived class.
pub(crate) fn remote_error(status: u16, retry_after_ms: Option<u32>, body: &str) -> Error {
    let mut class = class_for_status(status);
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            match env.error.code.as_ref().and_then(|c| c.as_str()) {
                Some("insufficient_quota") => class = "quota_exhausted",
                Some("context_length_exceeded") => class = "request_too_large",
                _ => {}
            }
            env.error.message.unwrap_or_else(|| body.trim().to_string())
        }
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => body.trim().to_string(),
    };

    Error::Remote {
        status,
        class: class.to_string(),
        message,
        retryable: is_retryable_class(class),
        retry_after_ms,
    }
}
