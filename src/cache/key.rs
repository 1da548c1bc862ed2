//! Cache Key Module
//!
//! Validates keys before they are turned into filesystem paths.

use std::sync::OnceLock;

use regex::Regex;

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Word characters only, 1 to `MAX_KEY_LENGTH` of them.
fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"^[A-Za-z0-9_]{{1,{}}}$", MAX_KEY_LENGTH))
            .expect("key pattern is valid")
    })
}

// == Is Valid Key ==
/// Returns true if `key` may be used as a cache key.
///
/// Separators, dots, whitespace and anything outside `[A-Za-z0-9_]` are
/// rejected, so a valid key can never escape the cache root.
pub fn is_valid_key(key: &str) -> bool {
    key_pattern().is_match(key)
}

// == Validate Key ==
/// Strict form of [`is_valid_key`].
///
/// # Errors
/// Returns `CacheError::InvalidKey` carrying the rejected key.
pub fn validate_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}
