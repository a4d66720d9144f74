//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Catalogue persistence (URLs and link edges)
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::UrlStatus;
use crate::url::LinkClass;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A URL row read back from the database
#[derive(Debug, Clone)]
pub struct StoredUrl {
    pub key: String,
    pub raw: String,
    pub class: LinkClass,
    pub status: UrlStatus,
    pub failure: Option<String>,
    pub title: Option<String>,
    pub status_code: Option<u16>,
    pub discovered_from: Option<String>,
    pub discovered_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub seed: String,
    pub status: RunStatus,
}

/// Lifecycle of a persisted run
///
/// A run is `running` between `create_run` and `finish_run`; a crashed
/// process leaves it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
}

impl RunStatus {
    /// Final status for a crawl, depending on whether it was stopped early
    pub fn finished(interrupted: bool) -> Self {
        if interrupted {
            Self::Interrupted
        } else {
            Self::Completed
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        [Self::Running, Self::Completed, Self::Interrupted]
            .into_iter()
            .find(|status| status.to_db_string() == s)
    }
}
