//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sitewalk database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    seed TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Every catalogued URL, one row per key per run
CREATE TABLE IF NOT EXISTS urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    key TEXT NOT NULL,
    raw TEXT NOT NULL,
    class TEXT NOT NULL,
    status TEXT NOT NULL,
    failure TEXT,
    title TEXT,
    status_code INTEGER,
    discovered_from TEXT,
    discovered_at TEXT NOT NULL,
    UNIQUE(run_id, key)
);

CREATE INDEX IF NOT EXISTS idx_urls_run_status ON urls(run_id, status);

-- Track link relationships
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    from_url TEXT NOT NULL,
    to_url TEXT NOT NULL,
    UNIQUE(run_id, from_url, to_url)
);

CREATE INDEX IF NOT EXISTS idx_links_to ON links(run_id, to_url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
