//! MarketLens - Rust Backend Library
//!
//! Cached AI market analyses for a single stored business description.
//! It includes:
//! - HTTP command handlers and the axum router
//! - Per-feature analysis orchestration, caching and fetching
//! - Storage layer (SQLite key-value store, JSON config)
//! - Data models and utilities

pub mod cli;
pub mod commands;
pub mod models;
pub mod server;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::analysis::{AnalysisError, AnalysisResult, AnalysisState, TriggerOutcome};
pub use models::response::*;
pub use models::settings::{AppConfig, ProviderSecrets, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
