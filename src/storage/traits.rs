//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::{Catalogue, UrlStatus};
use crate::storage::{RunRecord, RunStatus, StoredUrl};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `seed` - The seed URL of the crawl
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, seed: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and stamps its finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Catalogue =====

    /// Writes every record and link edge of a catalogue in one transaction
    fn save_catalogue(&mut self, run_id: i64, catalogue: &Catalogue) -> StorageResult<()>;

    /// Loads the stored URLs of a run with the given status, in key order
    fn get_urls_by_status(&self, run_id: i64, status: UrlStatus) -> StorageResult<Vec<StoredUrl>>;

    // ===== Statistics =====

    /// Number of URLs per status for a run
    fn count_by_status(&self, run_id: i64) -> StorageResult<HashMap<UrlStatus, u64>>;

    /// Total number of URLs stored for a run
    fn count_urls(&self, run_id: i64) -> StorageResult<u64>;

    /// Total number of link edges stored for a run
    fn count_links(&self, run_id: i64) -> StorageResult<u64>;
}
