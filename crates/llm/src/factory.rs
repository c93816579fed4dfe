//! Provider Factory
//!
//! Maps a `ProviderConfig` to a concrete backend. This is the only place that
//! branches on the backend type; everything downstream holds an
//! `Arc<dyn LlmProvider>`.

use std::sync::Arc;

use super::gemini::GeminiProvider;
use super::openai::OpenAIProvider;
use super::provider::{missing_api_key_error, LlmProvider};
use super::proxy_chat::ProxyChatProvider;
use super::retry::{RetryPolicy, RetryingProvider};
use super::types::{LlmResult, ProviderConfig, ProviderType};

/// Create a provider from configuration.
///
/// Fails fast with a configuration error when the backend needs a credential
/// and none is configured. Wraps the provider in [`RetryingProvider`] only when
/// `max_retries > 0`.
pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    let has_key = config
        .api_key
        .as_deref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    if config.provider.requires_api_key() && !has_key {
        return Err(missing_api_key_error(&config.provider.to_string()));
    }

    let max_retries = config.max_retries;
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderType::Proxy => Arc::new(ProxyChatProvider::new(config)),
        ProviderType::Groq | ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)),
        ProviderType::Gemini => Arc::new(GeminiProvider::new(config)),
    };

    tracing::info!(
        provider = provider.name(),
        model = provider.model(),
        max_retries,
        "LLM provider configured"
    );

    if max_retries > 0 {
        Ok(Arc::new(RetryingProvider::new(
            provider,
            RetryPolicy::new(max_retries),
        )))
    } else {
        Ok(provider)
    }
}
