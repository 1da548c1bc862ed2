//! File Cache - A file-based key/value cache
//!
//! Stores arbitrary bytes under a path derived from the key, with the first
//! characters of the key used as nested directories, and max-age expiration
//! measured from each file's modification time.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheEntry, Conditions, FileCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
