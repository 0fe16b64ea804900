//! URL lifecycle statuses written by indexq.
//!
//! The `status` column itself is free text; these are the values the tool
//! writes and looks for.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a tracked URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlStatus {
    /// Imported, not yet submitted
    New,
    /// Submitted to the indexing service
    SentToIndex,
}

impl UrlStatus {
    /// Get the string stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlStatus::New => "new",
            UrlStatus::SentToIndex => "sent_to_index",
        }
    }

    /// Get all statuses
    pub fn all() -> &'static [UrlStatus] {
        &[UrlStatus::New, UrlStatus::SentToIndex]
    }

    /// Match a `status` column value exactly, without the lenient parsing
    /// of [`FromStr`]
    pub fn from_stored(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|status| status.as_str() == s)
    }

    /// The value to store for user-supplied status text.
    ///
    /// Anything that parses as a known status becomes its canonical
    /// spelling; other text is stored trimmed but otherwise as given.
    pub fn normalize(raw: &str) -> String {
        match raw.parse::<UrlStatus>() {
            Ok(status) => status.as_str().to_string(),
            Err(_) => raw.trim().to_string(),
        }
    }
}

impl FromStr for UrlStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(UrlStatus::New),
            "sent_to_index" | "sent" => Ok(UrlStatus::SentToIndex),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in UrlStatus::all() {
            let parsed: UrlStatus = status.as_str().parse().unwrap();
            assert_eq!(*status, parsed);
        }
    }

    #[test]
    fn test_status_aliases() {
        assert_eq!(UrlStatus::from_str("sent").unwrap(), UrlStatus::SentToIndex);
        assert_eq!(UrlStatus::from_str(" NEW ").unwrap(), UrlStatus::New);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(UrlStatus::normalize("NEW"), "new");
        assert_eq!(UrlStatus::normalize("sent"), "sent_to_index");
        assert_eq!(UrlStatus::normalize(" Sent_To_Index "), "sent_to_index");
        assert_eq!(UrlStatus::normalize(" on-hold "), "on-hold");
    }

    #[test]
    fn test_from_stored_is_exact() {
        assert_eq!(UrlStatus::from_stored("new"), Some(UrlStatus::New));
        assert_eq!(UrlStatus::from_stored("sent_to_index"), Some(UrlStatus::SentToIndex));
        assert_eq!(UrlStatus::from_stored("NEW"), None);
        assert_eq!(UrlStatus::from_stored("sent"), None);
    }

    #[test]
    fn test_unknown_status() {
        let err = UrlStatus::from_str("crawled").unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(s) if s == "crawled"));
    }
}
