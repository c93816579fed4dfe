//! Cross-Platform Path Utilities
//!
//! Resolves the MarketLens data directory (`~/.marketlens/` unless
//! `MARKETLENS_HOME` points elsewhere) and the files inside it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "MARKETLENS_HOME";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the MarketLens directory (`$MARKETLENS_HOME` or `~/.marketlens/`)
pub fn marketlens_dir() -> AppResult<PathBuf> {
    match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(home_dir()?.join(".marketlens")),
    }
}

/// Get the config file path (`<data dir>/config.json`)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(marketlens_dir()?.join("config.json"))
}

/// Get the database file path (`<data dir>/data.db`)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(marketlens_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the MarketLens directory, creating it if it doesn't exist
pub fn ensure_marketlens_dir() -> AppResult<PathBuf> {
    let path = marketlens_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
