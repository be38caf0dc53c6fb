//! Physical directory identity for rescan avoidance.
//!
//! # Overview
//!
//! The same physical directory can be reached through several logical paths:
//! bind mounts, symlinked directories, or a candidate root nested inside a
//! root that was already scanned. [`VisitedDirectories`] remembers the
//! (device, inode) pair of every directory entered during a run so the
//! walker can skip repeats.
//!
//! # Platform Support
//!
//! - **Unix**: (device_id, inode) from directory metadata
//! - **Other**: no identity is available; every directory is treated as new
//!
//! # Example
//!
//! ```no_run
//! use dupetrim::scanner::identity::{DirectoryIdentity, VisitedDirectories};
//!
//! let mut visited = VisitedDirectories::new();
//! let meta = std::fs::metadata("/tmp").unwrap();
//!
//! assert!(visited.mark_visited(DirectoryIdentity::from_metadata(&meta)));
//! assert!(!visited.mark_visited(DirectoryIdentity::from_metadata(&meta)));
//! ```

use std::collections::HashSet;
use std::fs::Metadata;

/// (device, inode) pair identifying a physical directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectoryIdentity {
    /// Device the directory lives on
    pub device: u64,
    /// Inode number on that device
    pub inode: u64,
}

impl DirectoryIdentity {
    /// Derive the identity from directory metadata.
    ///
    /// Returns `None` on platforms without device/inode metadata.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    /// Derive the identity from directory metadata.
    ///
    /// Returns `None` on platforms without device/inode metadata.
    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Run-scoped set of directories already entered.
///
/// Append-only for the duration of a run. Not thread-safe; the walker owns
/// it exclusively.
#[derive(Debug, Default)]
pub struct VisitedDirectories {
    seen: HashSet<DirectoryIdentity>,
}

impl VisitedDirectories {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Record a directory as visited.
    ///
    /// Returns `true` if the directory was not seen before (or has no
    /// identity), meaning it should be scanned. Returns `false` for a
    /// repeat visit.
    pub fn mark_visited(&mut self, identity: Option<DirectoryIdentity>) -> bool {
        match identity {
            Some(id) => self.seen.insert(id),
            None => true,
        }
    }

    /// Number of distinct directories recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if no directory has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
