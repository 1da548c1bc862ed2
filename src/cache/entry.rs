//! Cache Entry Module
//!
//! Metadata snapshot of an entry as it currently sits on disk.

use std::fs::Metadata;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::Conditions;

// == Cache Entry ==
/// An on-disk entry. There is no in-memory index, so this is rebuilt from
/// file metadata every time it is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// The cache key, which is also the file name
    pub key: String,
    /// Absolute or root-relative path of the entry file
    pub path: PathBuf,
    /// Last write time, the basis for freshness checks
    pub modified: DateTime<Utc>,
    /// Content length in bytes
    pub size: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Builds an entry from the metadata of its file.
    ///
    /// Returns None when the platform cannot report modification times.
    pub fn from_metadata(key: &str, path: PathBuf, metadata: &Metadata) -> Option<Self> {
        let modified = metadata.modified().ok()?;
        Some(Self {
            key: key.to_string(),
            path,
            modified: DateTime::<Utc>::from(modified),
            size: metadata.len(),
        })
    }

    // == Age ==
    /// Whole seconds elapsed since the last write, never negative.
    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.modified).num_seconds().max(0)
    }

    // == Is Fresh ==
    /// Checks this entry against `conditions` at the current time.
    pub fn is_fresh(&self, conditions: &Conditions) -> bool {
        conditions.is_satisfied(self.modified, Utc::now())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry_written_ago(seconds: i64) -> CacheEntry {
        CacheEntry {
            key: "test_key".to_string(),
            path: PathBuf::from("t/e/test_key"),
            modified: Utc::now() - Duration::seconds(seconds),
            size: 5,
        }
    }

    #[test]
    fn test_age_seconds() {
        let entry = entry_written_ago(30);
        let age = entry.age_seconds();
        assert!((30..=31).contains(&age));
    }

    #[test]
    fn test_freshness_against_conditions() {
        let entry = entry_written_ago(30);
        assert!(entry.is_fresh(&Conditions::max_age(60)));
        assert!(!entry.is_fresh(&Conditions::max_age(10)));
        assert!(entry.is_fresh(&Conditions::none()));
    }

    #[test]
    fn test_from_metadata() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"hello").unwrap();
        let metadata = std::fs::metadata(file.path()).unwrap();

        let entry =
            CacheEntry::from_metadata("hello", file.path().to_path_buf(), &metadata).unwrap();
        assert_eq!(entry.key, "hello");
        assert_eq!(entry.size, 5);
        assert!(entry.age_seconds() <= 1);
    }

    #[test]
    fn test_serializes_to_json() {
        let entry = entry_written_ago(0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["key"], "test_key");
        assert_eq!(json["size"], 5);
        assert!(json["modified"].is_string());
    }
}
