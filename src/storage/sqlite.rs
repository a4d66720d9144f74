//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{Catalogue, UrlStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, StoredUrl};
use crate::url::LinkClass;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        seed: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(5, "status".to_string(), Type::Text)
        })?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, seed: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, seed, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, seed, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Catalogue =====

    fn save_catalogue(&mut self, run_id: i64, catalogue: &Catalogue) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        {
            let mut insert_url = tx.prepare(
                "INSERT OR REPLACE INTO urls
                 (run_id, key, raw, class, status, failure, title, status_code, discovered_from, discovered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for record in catalogue.records() {
                insert_url.execute(params![
                    run_id,
                    record.key,
                    record.raw,
                    record.class.as_str(),
                    record.status.to_db_string(),
                    record.failure.as_ref().map(|f| f.to_db_string()),
                    record.title,
                    record.status_code,
                    record.discovered_from,
                    record.discovered_at.to_rfc3339(),
                ])?;
            }

            let mut insert_link = tx.prepare(
                "INSERT OR IGNORE INTO links (run_id, from_url, to_url) VALUES (?1, ?2, ?3)",
            )?;

            for (from, to) in catalogue.edges() {
                insert_link.execute(params![run_id, from, to])?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            "Saved {} URLs and {} links for run {}",
            catalogue.len(),
            catalogue.edge_count(),
            run_id
        );
        Ok(())
    }

    fn get_urls_by_status(&self, run_id: i64, status: UrlStatus) -> StorageResult<Vec<StoredUrl>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, raw, class, status, failure, title, status_code, discovered_from, discovered_at
             FROM urls WHERE run_id = ?1 AND status = ?2 ORDER BY key",
        )?;

        let rows = stmt.query_map(params![run_id, status.to_db_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<u16>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut urls = Vec::new();
        for row in rows {
            let (key, raw, class, status, failure, title, status_code, discovered_from, discovered_at) =
                row?;

            let class = LinkClass::from_str_opt(&class)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown class '{}'", class)))?;
            let status = UrlStatus::from_db_string(&status)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown status '{}'", status)))?;

            urls.push(StoredUrl {
                key,
                raw,
                class,
                status,
                failure,
                title,
                status_code,
                discovered_from,
                discovered_at,
            });
        }

        Ok(urls)
    }

    // ===== Statistics =====

    fn count_by_status(&self, run_id: i64) -> StorageResult<HashMap<UrlStatus, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM urls WHERE run_id = ?1 GROUP BY status")?;

        let rows = stmt.query_map(params![run_id], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (status_str, count) = row?;
            if let Some(status) = UrlStatus::from_db_string(&status_str) {
                counts.insert(status, count as u64);
            }
        }

        Ok(counts)
    }

    fn count_urls(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM urls WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_links(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM links WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
