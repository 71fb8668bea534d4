//! Shared HTTP client and service error mapping.

use std::sync::OnceLock;

use crate::error::AgentError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// No overall request timeout is set: a response stream stays open for as
/// long as the agent keeps producing events.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> AgentError {
    let message = extract_message(body);
    match status {
        401 | 403 => AgentError::Authentication(message),
        429 => AgentError::RateLimited(message),
        _ => AgentError::Api { status, message },
    }
}

/// Map an `exception` frame received mid-stream to an error.
pub fn exception_to_error(exception_type: &str, payload: &[u8]) -> AgentError {
    let message = extract_message(&String::from_utf8_lossy(payload));
    match exception_type {
        "accessDeniedException" => AgentError::Authentication(message),
        "throttlingException" => AgentError::RateLimited(message),
        other => AgentError::Service {
            exception: other.to_string(),
            message,
        },
    }
}

/// Service error bodies are JSON with a `message` (or `Message`) field.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("Message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
