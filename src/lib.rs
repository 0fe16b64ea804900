//! # indexq - URL indexing tracker
//!
//! Keeps a local SQLite record of URLs that should be submitted to a
//! search engine for (re)indexing.
//!
//! indexq provides:
//! - The `indexing_urls` table definition and its init script
//! - A store for importing URLs and tracking their submission status
//! - Per-status statistics over the tracked URLs

pub mod status;
pub mod record;
pub mod storage;
pub mod config;
pub mod commands;
pub mod ui;

// Re-exports for convenient access
pub use status::UrlStatus;
pub use record::{IndexingUrl, NewIndexingUrl};
pub use storage::UrlStore;

/// Result type alias for indexq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for indexq operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate value for unique column `{column}`")]
    Duplicate { column: String },

    #[error("URL is empty")]
    EmptyUrl,

    #[error("Unknown URL status: {0}")]
    InvalidStatus(String),
}

impl Error {
    /// Whether this error is a uniqueness violation
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Duplicate { .. })
    }
}
