//! Cache Module
//!
//! Provides a file-based cache with prefix-sharded directories and max-age expiration.

mod entry;
mod expiry;
mod key;
mod path;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use expiry::{is_fresh, Conditions, MAX_AGE};
pub use key::{is_valid_key, validate_key};
pub use path::map_path;
pub use store::FileCache;

// == Public Constants ==
/// Maximum allowed key length in characters
pub const MAX_KEY_LENGTH: usize = 255;

/// Maximum number of shard directory levels
pub const MAX_SHARD_DEPTH: usize = 12;

/// Shard depth used when none is configured
pub const DEFAULT_SHARD_DEPTH: usize = 5;

/// Default max-age in seconds (one day)
pub const DEFAULT_MAX_AGE: i64 = 86_400;
