//! MarketLens Core
//!
//! Foundational types shared across the MarketLens workspace. This crate has
//! no dependency on HTTP, SQLite, or LLM provider code.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `feature` - Analysis feature catalogue (`Feature`, `FeatureSource`)
//! - `kv` - Injected persistence interface (`KeyValueStore`, `MemoryKvStore`)

pub mod error;
pub mod feature;
pub mod kv;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Features ───────────────────────────────────────────────────────────
pub use feature::{Feature, FeatureSource};

// ── Persistence ────────────────────────────────────────────────────────
pub use kv::{KeyValueStore, MemoryKvStore};
