//! Duplicate grouping and bucket types.
//!
//! # Overview
//!
//! The funnel narrows candidates in three steps, each represented by a
//! bucket type:
//!
//! - [`SizeGroup`]: files sharing an exact size (no I/O)
//! - [`HeadGroup`]: files sharing size and head digest
//! - [`DuplicateGroup`]: files sharing size and full digest, confirmed duplicates
//!
//! Every bucket keeps its members in discovery order, and every stage emits
//! buckets ordered by the discovery index of their first member.
//!
//! # Example
//!
//! ```
//! use dupetrim::scanner::FileRecord;
//! use dupetrim::duplicates::group_by_size;
//! use dupetrim::RunStatistics;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/a.txt"), 100, false, 0),
//!     FileRecord::new(PathBuf::from("/b.txt"), 100, false, 1),
//!     FileRecord::new(PathBuf::from("/c.txt"), 200, false, 2),
//! ];
//!
//! let mut stats = RunStatistics::default();
//! let groups = group_by_size(files, &mut stats);
//!
//! // Only the 100-byte group survives
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].size, 100);
//! assert_eq!(stats.discarded_unique_size, 1);
//! assert_eq!(stats.distinct_sizes, 2);
//! ```

use std::collections::HashMap;
use std::hash::Hash as StdHash;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// A group of files with the same size.
#[derive(Debug)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in discovery order
    pub files: Vec<FileRecord>,
}

impl SizeGroup {
    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Files sharing a size and a head digest.
#[derive(Debug)]
pub struct HeadGroup {
    /// File size in bytes
    pub size: u64,
    /// Digest of the first `HEAD_SIZE` bytes
    pub head_hash: Hash,
    /// Members in discovery order
    pub files: Vec<FileRecord>,
}

/// Confirmed duplicate group of files.
#[derive(Debug, Serialize)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content (32 bytes)
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash,
    /// File size in bytes (shared by all files)
    pub size: u64,
    /// Byte-identical files in discovery order
    pub files: Vec<FileRecord>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<FileRecord>) -> Self {
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Check if a path belongs to this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// Split `files` into buckets by `key`, preserving member order.
///
/// Buckets are returned in order of their first member. Records for which
/// `key` returns `None` are passed to `rejected` and dropped.
pub(crate) fn bucket_by<K, F, R>(
    files: Vec<FileRecord>,
    mut key: F,
    mut rejected: R,
) -> Vec<(K, Vec<FileRecord>)>
where
    K: Eq + StdHash + Copy,
    F: FnMut(&FileRecord) -> Option<K>,
    R: FnMut(FileRecord),
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut buckets: Vec<(K, Vec<FileRecord>)> = Vec::new();

    for file in files {
        let Some(k) = key(&file) else {
            rejected(file);
            continue;
        };
        match positions.get(&k) {
            Some(&pos) => buckets[pos].1.push(file),
            None => {
                positions.insert(k, buckets.len());
                buckets.push((k, vec![file]));
            }
        }
    }

    buckets
}

/// Order buckets by the discovery index of their first member.
pub(crate) fn sort_by_discovery<T>(groups: &mut [T], first_index: impl Fn(&T) -> usize) {
    groups.sort_by_key(|g| first_index(g));
}
