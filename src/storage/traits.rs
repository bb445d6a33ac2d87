//! Storage traits and error types
//!
//! This module defines the trait interface for the job store and
//! associated error types.

use crate::crawler::ExtractedJobRecord;
use crate::output::RunSummary;
use crate::storage::{JobQuery, RunRecord, StoredJob};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent job-record store
///
/// Equality is by exact URL string and only non-deleted rows count. The
/// crawler calls `exists` before `insert`; a run is single-threaded so the
/// pair is not wrapped in a transaction.
pub trait JobStore {
    // ===== Job Records =====

    /// Returns true if a non-deleted record with this exact URL exists
    fn exists(&self, url: &str) -> StorageResult<bool>;

    /// Inserts a record unless a non-deleted row with the same URL exists
    ///
    /// # Returns
    ///
    /// `true` if a row was written, `false` if the URL was already stored
    fn insert(&mut self, record: &ExtractedJobRecord, run_id: i64) -> StorageResult<bool>;

    /// Marks the record with this URL as deleted
    ///
    /// Returns `true` if a live row was found.
    fn soft_delete(&mut self, url: &str) -> StorageResult<bool>;

    /// Lists non-deleted records matching the query, newest first
    fn list_jobs(&self, query: &JobQuery) -> StorageResult<Vec<StoredJob>>;

    /// Counts non-deleted records
    fn count_jobs(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, query: &str, city_code: &str)
        -> StorageResult<i64>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed and records its summary counters
    fn complete_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()>;
}
