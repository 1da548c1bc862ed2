//! Configuration Module
//!
//! Construction-time options for a `FileCache`, loadable from defaults,
//! environment variables or a JSON options map.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use serde::Deserialize;

use crate::cache::{Conditions, DEFAULT_MAX_AGE, DEFAULT_SHARD_DEPTH};
use crate::error::{CacheError, Result};

/// File cache configuration parameters.
///
/// Strictness is carried here explicitly; operations never consult
/// process-wide state to decide whether a filesystem failure is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Root directory; must exist and be writable
    pub cache_directory: PathBuf,
    /// Number of leading key characters used as directory levels
    pub shard_depth: usize,
    /// Default freshness rules
    pub conditions: Conditions,
    /// Surface directory and write failures of `set` as errors
    pub strict: bool,
}

/// Legacy options map. Every field is optional and merged over the defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawOptions {
    cache_directory: Option<PathBuf>,
    shard_depth: Option<usize>,
    conditions: Option<BTreeMap<String, i64>>,
    strict: Option<bool>,
}

impl CacheConfig {
    /// Creates a config for `cache_directory` with every other option at its default.
    pub fn new(cache_directory: impl Into<PathBuf>) -> Self {
        Self {
            cache_directory: cache_directory.into(),
            ..Self::default()
        }
    }

    /// Sets the shard depth.
    pub fn with_shard_depth(mut self, shard_depth: usize) -> Self {
        self.shard_depth = shard_depth;
        self
    }

    /// Sets the default freshness rules.
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Enables or disables strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FILE_CACHE_DIR` - Cache root directory (default: `cache`)
    /// - `FILE_CACHE_SHARD_DEPTH` - Shard depth (default: 5)
    /// - `FILE_CACHE_MAX_AGE` - Default max-age in seconds (default: 86400)
    /// - `FILE_CACHE_STRICT` - `true` to enable strict mode (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_directory: env::var("FILE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_directory),
            shard_depth: env::var("FILE_CACHE_SHARD_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.shard_depth),
            conditions: env::var("FILE_CACHE_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Conditions::max_age)
                .unwrap_or(defaults.conditions),
            strict: env::var("FILE_CACHE_STRICT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.strict),
        }
    }

    // == From JSON ==
    /// Parses an options map such as
    /// `{"cacheDirectory": "/tmp/c", "conditions": {"max-age": 60}}`.
    ///
    /// # Errors
    /// - `CacheError::Configuration` if the document is malformed
    /// - `CacheError::UnsupportedCondition` for any rule other than `max-age`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawOptions = serde_json::from_str(json)
            .map_err(|e| CacheError::Configuration(format!("invalid options: {}", e)))?;

        let defaults = Self::default();
        let conditions = match raw.conditions {
            Some(rules) => Conditions::from_map(rules)?,
            None => defaults.conditions,
        };

        Ok(Self {
            cache_directory: raw.cache_directory.unwrap_or(defaults.cache_directory),
            shard_depth: raw.shard_depth.unwrap_or(defaults.shard_depth),
            conditions,
            strict: raw.strict.unwrap_or(defaults.strict),
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from("cache"),
            shard_depth: DEFAULT_SHARD_DEPTH,
            conditions: Conditions::max_age(DEFAULT_MAX_AGE),
            strict: false,
        }
    }
}
