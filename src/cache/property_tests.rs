//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check path mapping, storage and expiration properties.

use proptest::prelude::*;
use std::path::Component;
use tempfile::TempDir;

use crate::cache::{is_valid_key, map_path, Conditions, FileCache, MAX_SHARD_DEPTH};
use crate::config::CacheConfig;
use crate::error::CacheError;

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Generates keys with at least one forbidden character
fn invalid_key_strategy() -> impl Strategy<Value = String> {
    ("[a-z]{0,8}", "[/?.\\\\ :*-]", "[a-z]{0,8}").prop_map(|(a, bad, b)| format!("{}{}{}", a, bad, b))
}

/// Generates cache contents, including empty and binary values
fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

fn temp_cache() -> (TempDir, FileCache) {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(CacheConfig::new(dir.path())).unwrap();
    (dir, cache)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Sharded path: min(len, depth) single-character directories, then the key.
    #[test]
    fn prop_map_path_shape(key in valid_key_strategy(), depth in 0..=MAX_SHARD_DEPTH) {
        let path = map_path(&key, depth);
        let components: Vec<String> = path
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_string_lossy().into_owned(),
                other => panic!("unexpected component {:?}", other),
            })
            .collect();

        let shards = key.len().min(depth);
        prop_assert_eq!(components.len(), shards + 1);
        for (i, segment) in components[..shards].iter().enumerate() {
            prop_assert_eq!(segment, &key[i..i + 1]);
        }
        prop_assert_eq!(&components[shards], &key);
    }

    #[test]
    fn prop_invalid_keys_rejected(key in invalid_key_strategy()) {
        let (_dir, cache) = temp_cache();

        prop_assert!(!is_valid_key(&key));
        prop_assert!(matches!(cache.set(&key, "value"), Err(CacheError::InvalidKey(_))));
        prop_assert!(cache.get(&key).is_none());
        prop_assert!(!cache.exists(&key));
    }

    // Storing a value and reading it back before expiration returns the same bytes.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in value_strategy()) {
        let (_dir, cache) = temp_cache();

        prop_assert!(cache.set(&key, &value).unwrap());
        prop_assert_eq!(cache.get(&key).unwrap(), value);
    }

    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let (_dir, cache) = temp_cache();

        cache.set(&key, &value1).unwrap();
        cache.set(&key, &value2).unwrap();
        prop_assert_eq!(cache.get(&key).unwrap(), value2);
    }

    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in value_strategy()) {
        let (_dir, cache) = temp_cache();

        cache.set(&key, &value).unwrap();
        prop_assert!(cache.exists(&key));

        cache.delete(&key).unwrap();
        prop_assert!(!cache.exists(&key));

        // Deleting again is a no-op
        prop_assert!(cache.delete(&key).is_ok());
    }

    #[test]
    fn prop_non_positive_max_age_never_fresh(
        key in valid_key_strategy(),
        max_age in -3600i64..=0
    ) {
        let (_dir, cache) = temp_cache();

        cache.set(&key, "content").unwrap();
        prop_assert!(cache.get_with(&key, &Conditions::max_age(max_age)).is_none());
    }
}
