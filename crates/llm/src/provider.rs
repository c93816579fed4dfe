//! LLM Provider Trait
//!
//! Defines the single "send messages, get text" contract every provider
//! backend implements, plus the shared error-classification helpers.

use std::time::Duration;

use async_trait::async_trait;

use super::types::{LlmError, LlmResult, Message, ProviderConfig};

/// Trait that all chat-completion backends implement.
///
/// Swapping one implementation for another must not change what callers
/// observe: the reply text on success, a classified [`LlmError`] otherwise.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the model in use.
    fn model(&self) -> &str;

    /// Send an ordered prompt and return the assistant's reply text.
    ///
    /// Exactly one network call is made per invocation. Implementations reject
    /// a prompt without a system and a user message before calling out.
    async fn send_messages(&self, messages: &[Message]) -> LlmResult<String>;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;
}

/// Helper function to create an error for a missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::ConfigurationMissing {
        message: format!("API key not configured for {}", provider),
    }
}

/// Pull the provider's own error text out of an error body.
///
/// Understands `{"error": {"message": ...}}`, `{"error": "..."}` and
/// `{"message": ...}`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = match &value["error"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
    .or_else(|| value["message"].as_str().map(str::to_string))?;

    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Classify a non-success HTTP status, preferring the provider's message.
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    let message =
        extract_error_message(body).unwrap_or_else(|| format!("No response from {}", provider));

    match status {
        401 | 403 => LlmError::AuthenticationFailed { message },
        429 => LlmError::RateLimited {
            message,
            retry_after: None,
        },
        400 | 404 | 422 => LlmError::InvalidRequest { message },
        500..=599 => LlmError::ServerError {
            message,
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, message),
        },
    }
}

/// Classify a transport-level failure from reqwest.
///
/// The request URL is stripped from the message so query-string credentials
/// never reach logs or user-facing errors.
pub fn map_request_error(err: reqwest::Error, provider: &str, timeout: Duration) -> LlmError {
    if err.is_timeout() {
        return LlmError::Timeout {
            message: format!(
                "{} did not respond within {}s",
                provider,
                timeout.as_secs()
            ),
        };
    }

    let connect = err.is_connect();
    let err = err.without_url();
    if connect {
        LlmError::NetworkError {
            message: format!("{} is unavailable: {}", provider, err),
        }
    } else {
        LlmError::NetworkError {
            message: err.to_string(),
        }
    }
}
