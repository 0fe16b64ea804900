//! Row types for the `indexing_urls` table.
//!
//! Only `id` is guaranteed present: every other column is nullable in the
//! table definition, so the persisted row mirrors that with `Option`.

use crate::UrlStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A persisted row of `indexing_urls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingUrl {
    /// Row id assigned by SQLite
    pub id: i64,
    /// The tracked URL
    pub url: Option<String>,
    /// Lifecycle state, see [`UrlStatus`] for the values indexq writes
    pub status: Option<String>,
    /// When the row was created
    pub created: Option<NaiveDateTime>,
    /// When the row was last modified
    pub updated: Option<NaiveDateTime>,
}

impl IndexingUrl {
    /// The stored status, if it is exactly one indexq writes
    pub fn known_status(&self) -> Option<UrlStatus> {
        self.status.as_deref().and_then(UrlStatus::from_stored)
    }

    /// Whether the URL is still waiting to be submitted
    pub fn is_pending(&self) -> bool {
        self.known_status() == Some(UrlStatus::New)
    }
}

/// Insert payload for `indexing_urls`.
///
/// Leaving `id` unset lets SQLite assign the next one. Any column left
/// unset is stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIndexingUrl {
    pub id: Option<i64>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
}

impl NewIndexingUrl {
    /// A row for `url` with every other column unset
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// A freshly imported URL: status `new`, both timestamps set to `now`
    pub fn fresh(url: impl Into<String>, now: NaiveDateTime) -> Self {
        Self::new(url)
            .with_status(UrlStatus::New.as_str())
            .with_timestamps(now)
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set both `created` and `updated`
    pub fn with_timestamps(mut self, at: NaiveDateTime) -> Self {
        self.created = Some(at);
        self.updated = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_fresh_row() {
        let row = NewIndexingUrl::fresh("https://example.com/a", at());
        assert_eq!(row.id, None);
        assert_eq!(row.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(row.status.as_deref(), Some("new"));
        assert_eq!(row.created, Some(at()));
        assert_eq!(row.updated, Some(at()));
    }

    #[test]
    fn test_bare_row_leaves_columns_unset() {
        let row = NewIndexingUrl::new("https://example.com/b").with_id(7);
        assert_eq!(row.id, Some(7));
        assert!(row.status.is_none());
        assert!(row.created.is_none());
        assert!(row.updated.is_none());
    }

    #[test]
    fn test_known_status() {
        let mut row = IndexingUrl {
            id: 1,
            url: Some("https://example.com/".to_string()),
            status: Some("new".to_string()),
            created: None,
            updated: None,
        };
        assert!(row.is_pending());

        row.status = Some("NEW".to_string());
        assert!(!row.is_pending());

        row.status = Some("archived".to_string());
        assert_eq!(row.known_status(), None);
        assert!(!row.is_pending());

        row.status = None;
        assert!(!row.is_pending());
    }
}
