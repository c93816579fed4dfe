//! MarketLens LLM
//!
//! A single "send messages, get text" contract over interchangeable
//! chat-completion backends:
//! - Chat proxy (the app's own `/api/chat`, credential held server-side)
//! - Groq / OpenAI (OpenAI-compatible chat completions, called directly)
//! - Gemini (`generateContent`)
//!
//! Also includes the HTTP client factory, the provider factory, and an
//! optional bounded-retry wrapper.

pub mod factory;
pub mod gemini;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod proxy_chat;
pub mod retry;
pub mod types;

// Re-export main types
pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::{extract_error_message, LlmProvider};
pub use proxy_chat::ProxyChatProvider;
pub use retry::{RetryPolicy, RetryingProvider};
pub use types::*;
