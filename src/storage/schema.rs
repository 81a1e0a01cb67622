//! Database schema definitions
//!
//! This module contains the SQL schema for the crawl history database.

/// SQL schema for the database
///
/// `emails` and `trackers` hold JSON arrays of strings; `timestamp` is RFC 3339 UTC.
pub const SCHEMA_SQL: &str = r#"
-- One row per completed crawl
CREATE TABLE IF NOT EXISTS crawls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT,
    emails TEXT,
    trackers TEXT,
    timestamp TEXT
);

CREATE INDEX IF NOT EXISTS idx_crawls_timestamp ON crawls(timestamp);
"#;

/// Initializes the database schema
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
