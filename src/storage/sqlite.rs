//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CrawlStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CrawlStore, StorageError, StorageResult};
use crate::storage::PersistedCrawl;
use crate::CrawlResult;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
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
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts a crawl with an explicit timestamp
    fn insert_crawl(&mut self, url: &str, result: &CrawlResult, timestamp: &str) -> StorageResult<i64> {
        let emails = to_json(&result.emails)?;
        let trackers = to_json(&result.trackers)?;

        self.conn.execute(
            "INSERT INTO crawls (url, emails, trackers, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![url, emails, trackers, timestamp],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

impl CrawlStore for SqliteStorage {
    fn record_crawl(&mut self, url: &str, result: &CrawlResult) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let id = self.insert_crawl(url, result, &now)?;
        tracing::debug!("Stored crawl {} of {}", id, url);
        Ok(id)
    }

    fn list_crawls(&self) -> StorageResult<Vec<PersistedCrawl>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, emails, trackers, timestamp FROM crawls
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, url, emails, trackers, timestamp)| {
                Ok(PersistedCrawl {
                    id,
                    url: url.unwrap_or_default(),
                    emails: from_json(emails.as_deref())?,
                    trackers: from_json(trackers.as_deref())?,
                    timestamp: parse_timestamp(timestamp.as_deref())?,
                })
            })
            .collect()
    }

    fn count_crawls(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawls", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn to_json(items: &[String]) -> StorageResult<String> {
    serde_json::to_string(items).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decodes a stored RFC 3339 timestamp; every row written here carries one
fn parse_timestamp(raw: Option<&str>) -> StorageResult<DateTime<Utc>> {
    let raw = raw.ok_or_else(|| StorageError::Serialization("crawl has no timestamp".to_string()))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("bad timestamp '{raw}': {e}")))
}

/// Decodes a JSON string array; a NULL column reads as empty
fn from_json(raw: Option<&str>) -> StorageResult<Vec<String>> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => {
            serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
        }
    }
}
