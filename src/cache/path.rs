//! Path Mapping Module
//!
//! Maps a key to its sharded location below the cache root.
//!
//! Each of the first `shard_depth` characters of the key becomes one
//! directory level and the key itself is the file name, so with depth 5
//! `helloworld` lives at `h/e/l/l/o/helloworld`.

use std::path::PathBuf;

// == Map Path ==
/// Returns the path of `key` relative to the cache root.
///
/// Keys shorter than `shard_depth` produce one level per character and no
/// padding. The key is expected to be validated already.
pub fn map_path(key: &str, shard_depth: usize) -> PathBuf {
    let mut path: PathBuf = key
        .chars()
        .take(shard_depth)
        .map(String::from)
        .collect();
    path.push(key);
    path
}
