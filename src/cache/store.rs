//! Cache Store Module
//!
//! Main cache engine mapping keys to sharded files below a root directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::{is_valid_key, map_path, validate_key, CacheEntry, Conditions, MAX_SHARD_DEPTH};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == File Cache ==
/// File-based key/value cache.
///
/// Holds configuration only: the root directory, the shard depth, the default
/// freshness rules and the strictness flag. Every operation is an independent
/// filesystem transaction; concurrent writers of the same key race with
/// last-writer-wins semantics.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Root directory for cached files
    cache_directory: PathBuf,
    /// Leading key characters turned into directory levels
    shard_depth: usize,
    /// Default freshness rules
    conditions: Conditions,
    /// Whether `set` reports filesystem failures as errors
    strict: bool,
}

impl FileCache {
    // == Constructor ==
    /// Creates a FileCache from `config`.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` if the directory is missing or not
    /// writable, or if the shard depth exceeds `MAX_SHARD_DEPTH`.
    pub fn new(config: CacheConfig) -> Result<Self> {
        check_directory(&config.cache_directory)?;
        check_shard_depth(config.shard_depth)?;

        info!(
            cache_dir = %config.cache_directory.display(),
            shard_depth = config.shard_depth,
            max_age = ?config.conditions.max_age,
            strict = config.strict,
            "File cache initialized"
        );

        Ok(Self {
            cache_directory: config.cache_directory,
            shard_depth: config.shard_depth,
            conditions: config.conditions,
            strict: config.strict,
        })
    }

    // == Accessors ==
    /// Returns the cache root directory.
    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Returns the current shard depth.
    pub fn shard_depth(&self) -> usize {
        self.shard_depth
    }

    /// Returns the default freshness rules.
    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Returns true if filesystem failures in `set` are reported as errors.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    // == Set Cache Directory ==
    /// Switches the cache root to an existing, writable directory.
    ///
    /// On error the previous root is kept.
    pub fn set_cache_directory(&mut self, cache_directory: impl Into<PathBuf>) -> Result<()> {
        let cache_directory = cache_directory.into();
        check_directory(&cache_directory)?;

        info!(
            from = %self.cache_directory.display(),
            to = %cache_directory.display(),
            "Cache directory changed"
        );
        self.cache_directory = cache_directory;
        Ok(())
    }

    // == Set Shard Depth ==
    /// Changes the shard depth, which must lie in `0..=MAX_SHARD_DEPTH`.
    ///
    /// On error the previous depth is kept. Entries written under another
    /// depth are not moved and become unreachable.
    pub fn set_shard_depth(&mut self, shard_depth: usize) -> Result<()> {
        check_shard_depth(shard_depth)?;
        self.shard_depth = shard_depth;
        Ok(())
    }

    /// Replaces the default freshness rules.
    pub fn set_conditions(&mut self, conditions: Conditions) {
        self.conditions = conditions;
    }

    // == Cache Path ==
    /// Returns the file path `key` is stored at.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidKey` for keys outside `[A-Za-z0-9_]{1,255}`.
    pub fn cache_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.entry_path(key))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_directory.join(map_path(key, self.shard_depth))
    }

    // == Set ==
    /// Stores `contents` under `key`, overwriting any previous entry.
    ///
    /// Missing shard directories are created. The write resets the entry's
    /// modification time, which later freshness checks are measured from.
    ///
    /// # Returns
    /// - `Ok(true)` once the file is written
    /// - `Ok(false)` if a directory or the file could not be created and the
    ///   cache is not strict
    ///
    /// # Errors
    /// - `CacheError::InvalidKey`, always
    /// - `CacheError::DirectoryCreate` / `CacheError::Write` in strict mode
    pub fn set(&self, key: &str, contents: impl AsRef<[u8]>) -> Result<bool> {
        validate_key(key)?;
        let path = self.entry_path(key);

        if !self.create_parent(&path)? {
            return Ok(false);
        }

        if let Err(source) = fs::write(&path, contents.as_ref()) {
            return self.soft_fail(CacheError::Write { path, source });
        }

        debug!(
            key = key,
            path = %path.display(),
            size = contents.as_ref().len(),
            "Stored entry"
        );
        Ok(true)
    }

    // == Exists ==
    /// Returns true if `key` has a fresh entry under the default rules.
    pub fn exists(&self, key: &str) -> bool {
        self.exists_with(key, &Conditions::none())
    }

    /// Like [`FileCache::exists`], with `overrides` layered over the default rules.
    ///
    /// Invalid keys are reported as absent.
    pub fn exists_with(&self, key: &str, overrides: &Conditions) -> bool {
        self.fresh_entry(key, overrides).is_some()
    }

    // == Get ==
    /// Returns the contents of `key` if it has a fresh entry.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.get_with(key, &Conditions::none())
    }

    /// Like [`FileCache::get`], with `overrides` layered over the default rules.
    ///
    /// Invalid keys and unreadable files are misses. A stale file is left on
    /// disk until the next `set` overwrites it.
    pub fn get_with(&self, key: &str, overrides: &Conditions) -> Option<Vec<u8>> {
        let entry = self.fresh_entry(key, overrides)?;

        match fs::read(&entry.path) {
            Ok(contents) => {
                debug!(key = key, "Cache HIT");
                Some(contents)
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "Failed to read cached file");
                None
            }
        }
    }

    // == Entry ==
    /// Returns the metadata of the file stored for `key`, fresh or not.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        if !is_valid_key(key) {
            return None;
        }
        let path = self.entry_path(key);
        let metadata = fs::metadata(&path).ok().filter(|m| m.is_file())?;
        CacheEntry::from_metadata(key, path, &metadata)
    }

    // == Delete ==
    /// Removes the entry for `key`. Deleting a missing entry succeeds.
    ///
    /// # Errors
    /// - `CacheError::InvalidKey` for an invalid key
    /// - `CacheError::Delete` if the file exists but cannot be removed
    pub fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.entry_path(key);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key = key, path = %path.display(), "Deleted entry");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Delete { path, source }),
        }
    }

    // == Flush ==
    /// Removes every entry by deleting the cache root and recreating it empty.
    ///
    /// # Errors
    /// Returns `CacheError::Flush` if the root cannot be removed or recreated.
    pub fn flush(&self) -> Result<()> {
        let path = &self.cache_directory;

        fs::remove_dir_all(path).map_err(|source| CacheError::Flush {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(path).map_err(|source| CacheError::Flush {
            path: path.clone(),
            source,
        })?;

        info!(cache_dir = %path.display(), "Cache flushed");
        Ok(())
    }

    // == Get Or Compute ==
    /// Returns the fresh contents of `key`, producing and storing them on a miss.
    ///
    /// `producer` receives the entry path with its parent directories already
    /// created and any stale entry removed. If it writes that file itself, the written bytes win and its
    /// return value is discarded. Otherwise the returned bytes are stored with
    /// [`FileCache::set`] and returned, even if storing them failed in
    /// non-strict mode.
    ///
    /// # Errors
    /// - `CacheError::InvalidKey` for an invalid key
    /// - `CacheError::Producer` if `producer` fails
    /// - `CacheError::DirectoryCreate` / `CacheError::Write` in strict mode
    pub fn get_or_compute<F>(&self, key: &str, producer: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&Path) -> anyhow::Result<Vec<u8>>,
    {
        validate_key(key)?;

        if let Some(contents) = self.get(key) {
            return Ok(contents);
        }

        debug!(key = key, "Cache MISS, computing");
        self.compute(key, producer)
    }

    /// Like [`FileCache::get_or_compute`], returning the entry path instead of
    /// its contents.
    ///
    /// # Errors
    /// As `get_or_compute`; additionally `CacheError::Write` if no file ends up
    /// at the entry path.
    pub fn get_or_compute_path<F>(&self, key: &str, producer: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> anyhow::Result<Vec<u8>>,
    {
        validate_key(key)?;
        let path = self.entry_path(key);

        if self.exists(key) {
            return Ok(path);
        }

        debug!(key = key, "Cache MISS, computing");
        self.compute(key, producer)?;

        if path.is_file() {
            Ok(path)
        } else {
            Err(CacheError::Write {
                path,
                source: io::Error::new(io::ErrorKind::NotFound, "computed entry was not stored"),
            })
        }
    }

    fn compute<F>(&self, key: &str, producer: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&Path) -> anyhow::Result<Vec<u8>>,
    {
        let path = self.entry_path(key);
        self.create_parent(&path)?;

        // A stale entry is removed first so that any file present afterwards
        // was written by the producer.
        match fs::remove_file(&path) {
            Ok(()) => debug!(key = key, "Removed stale entry before computing"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(CacheError::Delete { path, source }),
        }

        let produced = producer(&path)?;

        if path.is_file() {
            match fs::read(&path) {
                Ok(written) => {
                    debug!(key = key, path = %path.display(), "Producer wrote entry");
                    return Ok(written);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read producer output");
                }
            }
        }

        self.set(key, &produced)?;
        Ok(produced)
    }

    // == Helpers ==
    /// Creates the shard directories above `path`.
    ///
    /// Returns `Ok(false)` on failure in non-strict mode.
    fn create_parent(&self, path: &Path) -> Result<bool> {
        let Some(parent) = path.parent() else {
            return Ok(true);
        };

        match fs::create_dir_all(parent) {
            Ok(()) => Ok(true),
            Err(source) => self.soft_fail(CacheError::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            }),
        }
    }

    /// Returns the error in strict mode, logs it and reports `false` otherwise.
    fn soft_fail(&self, err: CacheError) -> Result<bool> {
        if self.strict {
            return Err(err);
        }
        warn!(error = %err, "Cache write failed");
        Ok(false)
    }

    fn fresh_entry(&self, key: &str, overrides: &Conditions) -> Option<CacheEntry> {
        if !is_valid_key(key) {
            debug!(key = key, "Rejected invalid key");
            return None;
        }

        let conditions = overrides.merged_over(&self.conditions);
        match self.entry(key) {
            Some(entry) if entry.is_fresh(&conditions) => Some(entry),
            Some(_) => {
                debug!(key = key, "Cache MISS (stale)");
                None
            }
            None => {
                debug!(key = key, "Cache MISS");
                None
            }
        }
    }
}

/// Requires an existing directory that accepts new files.
fn check_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(CacheError::Configuration(format!(
            "cache directory {} does not exist",
            path.display()
        )));
    }

    tempfile::tempfile_in(path).map_err(|e| {
        CacheError::Configuration(format!(
            "cache directory {} is not writable: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

fn check_shard_depth(shard_depth: usize) -> Result<()> {
    if shard_depth > MAX_SHARD_DEPTH {
        return Err(CacheError::Configuration(format!(
            "shard depth {} exceeds maximum of {}",
            shard_depth, MAX_SHARD_DEPTH
        )));
    }
    Ok(())
}
