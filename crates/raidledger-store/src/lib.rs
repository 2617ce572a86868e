//! Raidledger Storage Layer
//!
//! Implements the clear-history, ledger and submission store traits on top of
//! SQLite.
//!
//! # Architecture
//!
//! - Relational tables for members, encounters and clear facts
//! - Ledger records and submissions kept as JSON documents keyed by identity
//! - Multi-row writes (review commits, submission intake, bulk clears) run in
//!   a single transaction
//!
//! # Examples
//!
//! ```no_run
//! use raidledger_store::SqliteStore;
//!
//! let store = SqliteStore::new("raidledger.db").unwrap();
//! // Store is now ready for clear and ledger operations
//! ```

#![warn(missing_docs)]

mod clears;
mod ledger;

use chrono::{DateTime, Utc};
use raidledger_domain::traits::StoreFailure;
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Conditional write lost against a concurrent writer
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// JSON document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreFailure for StoreError {
    fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    fn is_invalid(&self) -> bool {
        matches!(self, StoreError::InvalidData(_))
    }
}

/// SQLite-based implementation of the raidledger store traits
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; ledger writes are version-checked so that separate
/// instances on the same database cannot corrupt a member's total.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("store schema initialized");
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

/// Unix milliseconds for storage
pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Unix milliseconds back to a timestamp
pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::InvalidData(format!("Timestamp out of range: {}", ms)))
}

/// Lift a store error into rusqlite's row-mapping error
pub(crate) fn conversion_error(column: usize, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Integer, Box::new(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_store_initialization() {
        assert!(SqliteStore::in_memory().is_ok());
    }

    #[test]
    fn test_schema_is_reentrant() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(store.initialize_schema().is_ok());
    }

    #[test]
    fn test_millis_round_trip() {
        let ts = Utc.with_ymd_and_hms(2023, 8, 1, 12, 30, 0).unwrap();
        assert_eq!(from_millis(to_millis(ts)).unwrap(), ts);
    }

    #[test]
    fn test_error_classification() {
        assert!(StoreError::Conflict("x".into()).is_conflict());
        assert!(StoreError::NotFound("x".into()).is_not_found());
        assert!(!StoreError::InvalidData("x".into()).is_conflict());
        assert!(StoreError::InvalidData("x".into()).is_invalid());
    }
}
