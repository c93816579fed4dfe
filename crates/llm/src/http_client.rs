//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with a bounded
//! request timeout.

use std::time::Duration;

/// User agent sent with every outbound call.
const USER_AGENT: &str = concat!("MarketLens/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` whose requests abort after `timeout`.
///
/// Falls back to a default client if the builder fails (only possible when the
/// TLS backend cannot initialise).
pub fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}
