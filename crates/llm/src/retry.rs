//! Retrying Provider
//!
//! Wraps any [`LlmProvider`] with bounded exponential backoff. Only transient
//! failures (network, timeout, rate limit, 5xx) are retried; everything else is
//! returned on the first attempt. Callers see the same contract as the wrapped
//! provider.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;

use super::provider::LlmProvider;
use super::types::{LlmResult, Message, ProviderConfig};

/// Backoff parameters
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(8),
        }
    }
}

pub struct RetryingProvider {
    inner: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn send_messages(&self, messages: &[Message]) -> LlmResult<String> {
        if self.policy.max_retries == 0 {
            return self.inner.send_messages(messages).await;
        }

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.policy.initial_interval)
            .with_max_interval(self.policy.max_interval)
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let inner = &self.inner;
        let max_retries = self.policy.max_retries;

        backoff::future::retry(backoff, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            match inner.send_messages(messages).await {
                Ok(text) => Ok(text),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    tracing::warn!(
                        provider = inner.name(),
                        attempt = attempt + 1,
                        "Transient provider failure, retrying: {}",
                        e
                    );
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }

    fn config(&self) -> &ProviderConfig {
        self.inner.config()
    }
}
