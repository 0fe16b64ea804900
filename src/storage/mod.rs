//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - indexing_urls(id, url, status, created, updated)

pub mod schema;
pub mod sqlite;

pub use sqlite::{AddOutcome, ImportReport, StoreStats, UrlStore};
