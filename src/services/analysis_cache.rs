//! Analysis Cache
//!
//! Results keyed by `(feature, input)`, stored in the key-value store under
//! `{storageName}Analysis_{input}`. Entries never expire; a `put` replaces
//! whatever was there.

use std::sync::Arc;

use marketlens_core::{Feature, KeyValueStore};

use crate::models::analysis::AnalysisResult;
use crate::models::settings::CacheKeyPolicy;
use crate::utils::error::AppResult;

/// Build the persisted key for `(feature, input)`.
pub fn cache_key(feature: Feature, input: &str, policy: CacheKeyPolicy) -> String {
    let prefix = key_prefix(feature);
    match policy {
        CacheKeyPolicy::Raw => format!("{}{}", prefix, input),
        CacheKeyPolicy::Normalized => format!("{}{}", prefix, input.trim().to_lowercase()),
    }
}

fn key_prefix(feature: Feature) -> String {
    format!("{}Analysis_", feature.storage_name())
}

#[derive(Clone)]
pub struct AnalysisCache {
    store: Arc<dyn KeyValueStore>,
    policy: CacheKeyPolicy,
}

impl AnalysisCache {
    pub fn new(store: Arc<dyn KeyValueStore>, policy: CacheKeyPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> CacheKeyPolicy {
        self.policy
    }

    /// Cached result for `(feature, input)`.
    ///
    /// An entry that no longer decodes is reported as a miss so the next
    /// trigger fetches a fresh result and overwrites it.
    pub fn get(&self, feature: Feature, input: &str) -> AppResult<Option<AnalysisResult>> {
        let key = cache_key(feature, input, self.policy);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };

        match AnalysisResult::from_stored(feature, &raw) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                tracing::warn!(
                    feature = %feature,
                    "Ignoring undecodable cache entry: {}",
                    e
                );
                Ok(None)
            }
        }
    }

    /// Store `result` for `(feature, input)`, replacing any previous entry.
    pub fn put(&self, feature: Feature, input: &str, result: &AnalysisResult) -> AppResult<()> {
        let key = cache_key(feature, input, self.policy);
        self.store.set(&key, &result.to_stored())?;
        Ok(())
    }

    /// Number of cached results for `feature`.
    pub fn count(&self, feature: Feature) -> AppResult<usize> {
        Ok(self.store.keys_with_prefix(&key_prefix(feature))?.len())
    }
}
