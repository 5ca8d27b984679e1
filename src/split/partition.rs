//! Ownership-directory partitioning
//!
//! Groups changed files into buckets bounded by the nearest enclosing
//! directory that carries an `OWNERS` file.

use crate::types::ChangedFile;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Marker file bounding an ownership directory.
pub const OWNERS_FILE: &str = "OWNERS";

/// Bucket key for files whose walk ends at the repository root.
pub const ROOT_DIR: &str = ".";

/// Partition `files` into ownership-directory buckets.
///
/// Each file's directory is truncated to its first `max_depth` segments
/// (`max_depth == 0` means no limit), then walked upward until a known
/// bucket key or a directory containing [`OWNERS_FILE`] is found. The
/// walk stops at the repository root unconditionally, so a repository
/// with no marker files anywhere still terminates with a single root
/// bucket.
///
/// Every input file lands in exactly one bucket.
#[must_use]
pub fn partition_by_owners(
    root: &Path,
    files: &[ChangedFile],
    max_depth: usize,
) -> BTreeMap<String, Vec<ChangedFile>> {
    let mut buckets: BTreeMap<String, Vec<ChangedFile>> = BTreeMap::new();

    for file in files {
        let mut dir = parent_dir(&file.path);
        if max_depth >= 1 {
            dir = truncate_depth(&dir, max_depth);
        }
        loop {
            if buckets.contains_key(&dir) {
                break;
            }
            if dir == ROOT_DIR || root.join(&dir).join(OWNERS_FILE).is_file() {
                break;
            }
            dir = parent_dir(&dir);
        }
        debug!("{} -> {}", file.path, dir);
        buckets.entry(dir).or_default().push(file.clone());
    }

    buckets
}

/// Directory containing `path`; [`ROOT_DIR`] for top-level entries.
fn parent_dir(path: &str) -> String {
    path.rsplit_once('/')
        .map_or_else(|| ROOT_DIR.to_string(), |(parent, _)| parent.to_string())
}

/// First `depth` slash-separated segments of `dir`.
///
/// A directory shallower than `depth` is kept whole.
fn truncate_depth(dir: &str, depth: usize) -> String {
    if dir == ROOT_DIR {
        return dir.to_string();
    }
    dir.split('/').take(depth).collect::<Vec<_>>().join("/")
}
