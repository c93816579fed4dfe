//! SQLite Database
//!
//! Embedded key-value persistence using rusqlite with r2d2 connection pooling.
//! Backs both the stored business input and the analysis cache.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use marketlens_core::{CoreResult, KeyValueStore};

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::database_path;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// The pool holds a single connection so every caller sees the same
    /// in-memory database.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Open the database at the default location (`<data dir>/data.db`)
    pub fn new() -> AppResult<Self> {
        Self::open(database_path()?)
    }

    /// Open (or create) a database file at `path`
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let db_path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;

        tracing::debug!(path = %db_path.display(), "Database opened");
        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }

    /// Get a value by key
    pub fn get_entry(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.get_connection()?;
        let result = conn.query_row(
            "SELECT value FROM kv_entries WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// Insert or replace a value
    pub fn set_entry(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a value
    pub fn delete_entry(&self, key: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Keys starting with `prefix`, sorted ascending.
    ///
    /// Uses `substr` rather than `LIKE` so `%` and `_` in user-typed input
    /// match literally.
    pub fn keys_by_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT key FROM kv_entries WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let rows = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Number of stored entries
    pub fn entry_count(&self) -> AppResult<i64> {
        let conn = self.get_connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM kv_entries", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.get_entry(key)?)
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        Ok(self.set_entry(key, value)?)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        Ok(self.delete_entry(key)?)
    }

    fn keys_with_prefix(&self, prefix: &str) -> CoreResult<Vec<String>> {
        Ok(self.keys_by_prefix(prefix)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database() {
        let db = Database::new_in_memory().unwrap();
        assert!(db.is_healthy());
        assert_eq!(db.entry_count().unwrap(), 0);
    }

    #[test]
    fn test_set_and_get_entry() {
        let db = Database::new_in_memory().unwrap();
        assert_eq!(db.get_entry("businessInput").unwrap(), None);

        db.set_entry("businessInput", "organic tea brand").unwrap();
        assert_eq!(
            db.get_entry("businessInput").unwrap().as_deref(),
            Some("organic tea brand")
        );
    }

    #[test]
    fn test_set_entry_overwrites() {
        let db = Database::new_in_memory().unwrap();
        db.set_entry("swotAnalysis_tea", "first").unwrap();
        db.set_entry("swotAnalysis_tea", "second").unwrap();
        assert_eq!(db.get_entry("swotAnalysis_tea").unwrap().as_deref(), Some("second"));
        assert_eq!(db.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_delete_entry() {
        let db = Database::new_in_memory().unwrap();
        db.set_entry("k", "v").unwrap();
        db.delete_entry("k").unwrap();
        assert_eq!(db.get_entry("k").unwrap(), None);
        // Deleting a missing key is fine
        db.delete_entry("k").unwrap();
    }

    #[test]
    fn test_keys_by_prefix_is_literal() {
        let db = Database::new_in_memory().unwrap();
        db.set_entry("complianceAnalysis_tea", "a").unwrap();
        db.set_entry("complianceAnalysis_coffee", "b").unwrap();
        db.set_entry("complianceAnalysis%x", "c").unwrap();
        db.set_entry("icpAnalysis_tea", "d").unwrap();

        assert_eq!(
            db.keys_by_prefix("complianceAnalysis_").unwrap(),
            vec!["complianceAnalysis_coffee", "complianceAnalysis_tea"]
        );
        assert_eq!(
            db.keys_by_prefix("complianceAnalysis%").unwrap(),
            vec!["complianceAnalysis%x"]
        );
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("data.db");

        {
            let db = Database::open(&path).unwrap();
            db.set_entry("businessInput", "artisan bakery").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_entry("businessInput").unwrap().as_deref(),
            Some("artisan bakery")
        );
    }

    #[test]
    fn test_key_value_store_impl() {
        let db = Database::new_in_memory().unwrap();
        let store: &dyn KeyValueStore = &db;
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys_with_prefix("").unwrap(), vec!["a"]);
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }
}
