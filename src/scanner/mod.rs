//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Deterministic depth-first directory walking over reference and candidate roots
//! - Physical directory deduplication by device and inode
//! - Content hashing with BLAKE3 (head window and full content)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`identity`]: (device, inode) tracking of visited directories
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//! - [`record`]: Per-file records with memoized digests
//!
//! # Example
//!
//! ```no_run
//! use dupetrim::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(
//!     vec![PathBuf::from("/archive")],
//!     vec![PathBuf::from("/home/user/Downloads")],
//!     WalkerConfig::default(),
//! );
//!
//! for record in walker.walk() {
//!     match record {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => {
//!             eprintln!("Fatal: {}", e);
//!             break;
//!         }
//!     }
//! }
//! ```

pub mod hasher;
pub mod identity;
pub mod record;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::Serialize;

// Re-export main types
pub use hasher::{hash_to_hex, Hash, Hasher, HEAD_SIZE};
pub use identity::{DirectoryIdentity, VisitedDirectories};
pub use record::FileRecord;
pub use walker::{Walk, Walker};

/// A directory to scan, tagged as protected reference or deletion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRoot {
    /// Root directory path
    pub path: PathBuf,
    /// Files under reference roots are never deleted
    pub is_reference: bool,
}

impl ScanRoot {
    /// A protected reference root.
    #[must_use]
    pub fn reference(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_reference: true,
        }
    }

    /// A candidate root whose duplicates may be deleted.
    #[must_use]
    pub fn candidate(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_reference: false,
        }
    }

    /// Check that the root exists and is a directory.
    ///
    /// Symlinks are followed, so a symlink to a directory is a valid root.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] or [`ScanError::NotADirectory`].
    pub fn validate(&self) -> Result<(), ScanError> {
        validate_root(&self.path)
    }

    /// Resolve the root to its physical, symlink-free form.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PathResolution`] for missing paths, broken or
    /// looping symlinks.
    pub fn resolve(&self) -> Result<Self, ScanError> {
        let path = std::fs::canonicalize(&self.path).map_err(|source| {
            ScanError::PathResolution {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(Self {
            path,
            is_reference: self.is_reference,
        })
    }
}

fn validate_root(path: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ScanError::NotFound(path.to_path_buf()))
        }
        Err(source) => Err(ScanError::PathResolution {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into symlinked directories.
    /// Cycles are detected and counted as discarded directories.
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

/// Errors that can occur during directory scanning.
///
/// Every variant is fatal for the run.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified root path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be resolved to a physical path.
    #[error("Cannot resolve {path}: {source}")]
    PathResolution {
        /// Root as supplied
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Enumeration failed inside an already opened directory tree.
    #[error("Cannot scan {path}: {source}")]
    DirectoryScan {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PathResolution { path: p, .. }
            | Self::DirectoryScan { path: p, .. } => p,
        }
    }
}

/// Errors that can occur during file hashing.
///
/// Never fatal: the affected file is excluded from grouping.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
