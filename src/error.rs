//! Error types for the file cache
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the file cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key does not match `^[A-Za-z0-9_]{1,255}$`
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Cache directory or shard depth rejected
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Freshness rule other than `max-age`
    #[error("Cache condition {0} not supported")]
    UnsupportedCondition(String),

    /// Shard directories could not be created
    #[error("Failed to create dir {}: {source}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Entry file could not be written
    #[error("Failed to create file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Entry file exists but could not be removed
    #[error("Failed to delete file {}: {source}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cache root could not be cleared or recreated
    #[error("Failed to flush cache directory {}: {source}", .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Content producer passed to `get_or_compute` failed
    #[error("Content producer failed: {0}")]
    Producer(#[from] anyhow::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the file cache.
pub type Result<T> = std::result::Result<T, CacheError>;
