//! Storage layer for the web usage tracker.
//!
//! Provides a durable string-keyed map of JSON values using `rusqlite`, the
//! persistence collaborator behind [`wu_core::UsageStore`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The tracker only touches
//! it from its single event loop.
//!
//! # Schema
//!
//! One table, `kv`, keyed by TEXT. Values are JSON documents stored as TEXT.
//! `updated_at` records the last write in ISO 8601 UTC
//! (e.g., `2025-01-15T10:30:00.000Z`) for diagnostics.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use wu_core::{StoreError, UsageStore};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value was not valid JSON.
    #[error("invalid JSON stored under {key}: {source}")]
    InvalidJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads and parses the value stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, DbError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|source| DbError::InvalidJson {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    /// Inserts or replaces the value stored under `key`.
    pub fn set_value(&mut self, key: &str, value: &serde_json::Value) -> Result<(), DbError> {
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.conn.execute(
            "
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value.to_string(), updated_at],
        )?;
        tracing::trace!(key, "stored value");
        Ok(())
    }

    /// When `key` was last written, if ever.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>, DbError> {
        Ok(self
            .conn
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl UsageStore for Database {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.get_value(key)?)
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        Ok(self.set_value(key, &value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use wu_core::USAGE_DATA_KEY;

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_has_kv_table() {
        let db = Database::open_in_memory().unwrap();
        let columns: HashSet<_> = table_columns(&db.conn, "kv").into_iter().collect();
        let expected: HashSet<_> = ["key", "value", "updated_at"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(columns, expected);
    }

    #[test]
    fn missing_key_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_value(USAGE_DATA_KEY).unwrap(), None);
        assert_eq!(db.updated_at(USAGE_DATA_KEY).unwrap(), None);
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut db = Database::open_in_memory().unwrap();
        let first = serde_json::json!({"a.com": {"2025-01-15": 5}});
        let second = serde_json::json!({"a.com": {"2025-01-15": 9}});

        db.set_value(USAGE_DATA_KEY, &first).unwrap();
        db.set_value(USAGE_DATA_KEY, &second).unwrap();

        assert_eq!(db.get_value(USAGE_DATA_KEY).unwrap(), Some(second));
        assert!(db.updated_at(USAGE_DATA_KEY).unwrap().is_some());
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, 'not json', '')",
                params![USAGE_DATA_KEY],
            )
            .unwrap();

        let err = db.get_value(USAGE_DATA_KEY).unwrap_err();
        assert!(matches!(err, DbError::InvalidJson { .. }));
    }

    #[test]
    fn values_survive_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wu.db");
        let value = serde_json::json!({"example.com": {"2025-01-15": 42}});

        {
            let mut db = Database::open(&path).unwrap();
            UsageStore::set(&mut db, USAGE_DATA_KEY, value.clone()).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(UsageStore::get(&db, USAGE_DATA_KEY).unwrap(), Some(value));
    }
}
