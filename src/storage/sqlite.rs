//! SQLite storage implementation

use std::io::BufRead;
use std::path::Path;
use chrono::NaiveDateTime;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use serde::Serialize;
use crate::{Error, Result, UrlStatus};
use crate::record::{IndexingUrl, NewIndexingUrl};
use super::schema;

const SELECT_COLUMNS: &str = "SELECT id, url, status, created, updated FROM indexing_urls";

/// SQLite-backed storage for tracked URLs
pub struct UrlStore {
    conn: Connection,
}

impl UrlStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create the schema if missing, keeping existing rows
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Drop and recreate the table. All rows are lost.
    pub fn reset_schema(&self) -> Result<()> {
        for stmt in schema::init_statements() {
            self.conn.execute(stmt, [])?;
        }
        tracing::debug!("Recreated table {}", schema::TABLE);
        Ok(())
    }

    /// Names of the explicitly created indexes on the table
    pub fn index_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL ORDER BY name"
        )?;

        let names = stmt
            .query_map([schema::TABLE], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(names)
    }

    // ========== Row Operations ==========

    /// Insert a row, returning its id.
    ///
    /// Fails with [`Error::Duplicate`] when `id` or `url` is already taken.
    pub fn insert(&self, row: &NewIndexingUrl) -> Result<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO indexing_urls (id, url, status, created, updated)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![row.id, row.url, row.status, row.created, row.updated],
            )
            .map_err(map_constraint_error)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Add a URL for indexing with status `new`.
    ///
    /// A URL that is already tracked is reported, not treated as an error.
    /// Blank input is rejected with [`Error::EmptyUrl`].
    pub fn add_url(&self, url: &str, now: NaiveDateTime) -> Result<AddOutcome> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::EmptyUrl);
        }

        match self.insert(&NewIndexingUrl::fresh(url, now)) {
            Ok(id) => Ok(AddOutcome::Added(id)),
            Err(Error::Duplicate { column }) if column == "url" => Ok(AddOutcome::AlreadyPresent),
            Err(e) => Err(e),
        }
    }

    /// Import one URL per line inside a single transaction.
    ///
    /// Lines are trimmed and blank lines ignored. Lines that are not valid
    /// UTF-8 are counted as invalid and left out. Every added row gets the
    /// same `now` timestamp.
    pub fn import_urls<R: BufRead>(
        &mut self,
        reader: R,
        now: NaiveDateTime,
        log_interval: usize,
    ) -> Result<ImportReport> {
        self.begin_transaction()?;
        match self.import_lines(reader, now, log_interval.max(1)) {
            Ok(report) => {
                self.commit()?;
                tracing::info!("Total: {}", report);
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback() {
                    tracing::warn!("Rollback after failed import also failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    fn import_lines<R: BufRead>(
        &self,
        mut reader: R,
        now: NaiveDateTime,
        log_interval: usize,
    ) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                tracing::warn!("Line {} is not valid UTF-8, skipping", line_no);
                report.invalid += 1;
                continue;
            };
            let url = line.trim();
            if url.is_empty() {
                continue;
            }

            report.processed += 1;
            tracing::debug!("Processing url: {}", url);

            match self.add_url(url, now)? {
                AddOutcome::Added(_) => report.added += 1,
                AddOutcome::AlreadyPresent => {
                    tracing::debug!("URL {} is already in db", url);
                    report.skipped += 1;
                }
            }

            if report.processed % log_interval == 0 {
                tracing::info!("{}", report);
            }
        }

        Ok(report)
    }

    /// Get a row by id
    pub fn get(&self, id: i64) -> Result<Option<IndexingUrl>> {
        self.conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], |row| self.row_to_url(row))
            .optional()
            .map_err(Into::into)
    }

    /// Get a row by URL
    pub fn get_by_url(&self, url: &str) -> Result<Option<IndexingUrl>> {
        self.conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE url = ?1"), [url.trim()], |row| self.row_to_url(row))
            .optional()
            .map_err(Into::into)
    }

    /// The oldest URL still waiting to be submitted
    pub fn next_pending(&self) -> Result<Option<IndexingUrl>> {
        Ok(self.pending_urls(Some(1))?.into_iter().next())
    }

    /// URLs with status `new`, oldest first
    pub fn pending_urls(&self, limit: Option<usize>) -> Result<Vec<IndexingUrl>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE status = ?1 ORDER BY id LIMIT ?2"
        ))?;

        let urls = stmt
            .query_map(params![UrlStatus::New.as_str(), limit], |row| self.row_to_url(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(urls)
    }

    /// Every row, ordered by id
    pub fn all(&self) -> Result<Vec<IndexingUrl>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;

        let urls = stmt
            .query_map([], |row| self.row_to_url(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(urls)
    }

    /// Set the status of a URL and bump `updated`.
    ///
    /// Known statuses are stored in their canonical spelling, see
    /// [`UrlStatus::normalize`]. Returns `false` when no row has that URL.
    pub fn update_status(&self, url: &str, status: &str, now: NaiveDateTime) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE indexing_urls SET status = ?1, updated = ?2 WHERE url = ?3",
            params![UrlStatus::normalize(status), now, url.trim()],
        )?;
        Ok(changed > 0)
    }

    /// Count all rows
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM indexing_urls", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Row counts grouped by status; NULL status sorts first
    pub fn count_by_status(&self) -> Result<Vec<StatusCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM indexing_urls GROUP BY status ORDER BY status"
        )?;

        let counts = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok(StatusCount {
                    status: row.get(0)?,
                    count: count as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(counts)
    }

    /// Helper to convert a row to an IndexingUrl
    fn row_to_url(&self, row: &rusqlite::Row) -> rusqlite::Result<IndexingUrl> {
        Ok(IndexingUrl {
            id: row.get(0)?,
            url: row.get(1)?,
            status: row.get(2)?,
            created: row.get(3)?,
            updated: row.get(4)?,
        })
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            total: self.count()?,
            by_status: self.count_by_status()?,
        })
    }
}

/// Turn SQLite unique/primary-key failures into [`Error::Duplicate`]
fn map_constraint_error(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        let unique = failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            || message.as_deref().is_some_and(|m| m.starts_with("UNIQUE constraint failed"));
        if failure.code == ErrorCode::ConstraintViolation && unique {
            // "UNIQUE constraint failed: indexing_urls.url"
            let column = message
                .as_deref()
                .and_then(|m| m.rsplit('.').next())
                .unwrap_or("unknown")
                .trim()
                .to_string();
            return Error::Duplicate { column };
        }
    }
    err.into()
}

/// Result of adding a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(i64),
    AlreadyPresent,
}

/// Counters for a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Non-blank lines seen
    pub processed: usize,
    pub added: usize,
    /// Lines whose URL was already tracked
    pub skipped: usize,
    /// Lines that were not valid UTF-8
    pub invalid: usize,
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed {} urls. Added: {}, skipped: {}, invalid: {}",
            self.processed, self.added, self.skipped, self.invalid
        )
    }
}

/// Number of rows carrying one status value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Option<String>,
    pub count: usize,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
}

impl StoreStats {
    /// Rows with exactly this status
    pub fn count_for(&self, status: &str) -> usize {
        self.by_status
            .iter()
            .find(|c| c.status.as_deref() == Some(status))
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Rows still waiting to be submitted
    pub fn pending(&self) -> usize {
        self.count_for(UrlStatus::New.as_str())
    }
}
