//! LLM Types
//!
//! Core types for chat-completion provider interactions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// The app's own `/api/chat` route, which holds the credential server-side.
    Proxy,
    /// Groq's OpenAI-compatible endpoint, called directly.
    Groq,
    /// OpenAI chat completions, called directly.
    OpenAI,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::Proxy => write!(f, "proxy"),
            ProviderType::Groq => write!(f, "groq"),
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proxy" => Ok(ProviderType::Proxy),
            "groq" | "direct" => Ok(ProviderType::Groq),
            "openai" => Ok(ProviderType::OpenAI),
            "gemini" => Ok(ProviderType::Gemini),
            other => Err(LlmError::ConfigurationMissing {
                message: format!("unknown provider backend: {}", other),
            }),
        }
    }
}

impl ProviderType {
    /// Default model for the backend.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::Proxy => "mixtral-8x7b-32768",
            ProviderType::Groq => "llama3-70b-8192",
            ProviderType::OpenAI => "gpt-4o-mini",
            ProviderType::Gemini => "gemini-1.5-flash-latest",
        }
    }

    /// Whether the backend needs a client-side API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderType::Proxy)
    }
}

/// Configuration for a provider backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The provider backend
    pub provider: ProviderType,
    /// API key (not needed for the proxy backend)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Endpoint override (for the proxy backend this is the `/api/chat` URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model name to use
    pub model: String,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Client-side bound on a single call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bounded retries for transient failures (0 = single attempt)
    #[serde(default)]
    pub max_retries: u32,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::for_provider(ProviderType::Groq)
    }
}

impl ProviderConfig {
    /// Default configuration for a given backend.
    pub fn for_provider(provider: ProviderType) -> Self {
        Self {
            provider,
            api_key: None,
            base_url: None,
            model: provider.default_model().to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A `{role, content}` pair. Serializes exactly in the chat-completions shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// Reject prompts that lack a system instruction or a user message.
pub fn validate_messages(messages: &[Message]) -> LlmResult<()> {
    if messages.is_empty() {
        return Err(LlmError::InvalidRequest {
            message: "message list is empty".to_string(),
        });
    }
    let has_system = messages.iter().any(|m| m.role == MessageRole::System);
    let has_user = messages.iter().any(|m| m.role == MessageRole::User);
    if !has_system || !has_user {
        return Err(LlmError::InvalidRequest {
            message: "a system instruction and at least one user message are required".to_string(),
        });
    }
    Ok(())
}

/// OpenAI-compatible chat completion envelope.
///
/// Only the fields needed to extract the reply are modelled; everything else in
/// the provider's envelope is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Text of the first completion.
    ///
    /// Zero completions and empty text are both provider errors.
    pub fn into_text(self, provider: &str) -> LlmResult<String> {
        let first = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                message: format!("No response from {}", provider),
            })?;

        match first.message.and_then(|m| m.content) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::EmptyResponse {
                message: format!("Empty response from {}", provider),
            }),
        }
    }
}

/// Error types for LLM operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LlmError {
    /// Missing credential or unusable provider configuration
    ConfigurationMissing { message: String },
    /// Authentication failed (invalid API key)
    AuthenticationFailed { message: String },
    /// Rate limit exceeded
    RateLimited {
        message: String,
        retry_after: Option<u32>,
    },
    /// Invalid request (bad parameters or malformed prompt)
    InvalidRequest { message: String },
    /// Server error from the provider
    ServerError {
        message: String,
        status: Option<u16>,
    },
    /// Network/connection error
    NetworkError { message: String },
    /// The call exceeded the client-side timeout
    Timeout { message: String },
    /// Response parsing error
    ParseError { message: String },
    /// Zero completions or empty completion text
    EmptyResponse { message: String },
    /// The caller cancelled the request
    Cancelled,
    /// Other error
    Other { message: String },
}

impl LlmError {
    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::ServerError { .. }
                | LlmError::NetworkError { .. }
                | LlmError::Timeout { .. }
        )
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ConfigurationMissing { message } => {
                write!(f, "Configuration error: {}", message)
            }
            LlmError::AuthenticationFailed { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            LlmError::RateLimited { message, .. } => {
                write!(f, "Rate limited: {}", message)
            }
            LlmError::InvalidRequest { message } => {
                write!(f, "Invalid request: {}", message)
            }
            LlmError::ServerError { message, status } => {
                if let Some(s) = status {
                    write!(f, "Server error ({}): {}", s, message)
                } else {
                    write!(f, "Server error: {}", message)
                }
            }
            LlmError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            LlmError::Timeout { message } => {
                write!(f, "Request timed out: {}", message)
            }
            LlmError::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            LlmError::EmptyResponse { message } => write!(f, "{}", message),
            LlmError::Cancelled => write!(f, "Request cancelled"),
            LlmError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
