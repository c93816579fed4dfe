//! Stored Input
//!
//! The single business description every feature analyses. Writes go through
//! to the key-value store before the in-memory mirror changes, so a value
//! seen by `read()` is always one that survives a restart. Writers are
//! serialized so the store and the mirror always agree on the last value.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use marketlens_core::KeyValueStore;

use crate::utils::error::{AppError, AppResult};

/// Persisted slot holding the business description
pub const STORED_INPUT_KEY: &str = "businessInput";

pub struct StoredInput {
    store: Arc<dyn KeyValueStore>,
    mirror: watch::Sender<String>,
    write_lock: Mutex<()>,
}

impl StoredInput {
    /// Load the last saved value (or `""`) from `store`.
    pub fn load(store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let current = store.get(STORED_INPUT_KEY)?.unwrap_or_default();
        let (mirror, _) = watch::channel(current);
        Ok(Self {
            store,
            mirror,
            write_lock: Mutex::new(()),
        })
    }

    /// Last saved value, or `""` if nothing was ever written.
    pub fn read(&self) -> String {
        self.mirror.borrow().clone()
    }

    /// Persist `value` and publish it to subscribers.
    ///
    /// Subscribers are only notified when the value actually changes.
    pub fn write(&self, value: &str) -> AppResult<()> {
        let _serialized = self
            .write_lock
            .lock()
            .map_err(|_| AppError::internal("Stored input lock poisoned"))?;
        self.store.set(STORED_INPUT_KEY, value)?;
        self.mirror.send_if_modified(|current| {
            if current == value {
                false
            } else {
                *current = value.to_string();
                true
            }
        });
        tracing::debug!(len = value.len(), "Stored input updated");
        Ok(())
    }

    /// Receiver that observes every new value.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.mirror.subscribe()
    }
}
