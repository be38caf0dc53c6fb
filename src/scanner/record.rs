//! Per-file record with memoized content digests.
//!
//! A [`FileRecord`] is produced by the walker for every regular file. Its
//! head and full digests are computed lazily, at most once, and cached for
//! the lifetime of the record. Each cache is a [`OnceLock`], so records may be
//! hashed from a worker pool without double work.
//!
//! A digest that fails to compute is memoized as `None` ("unavailable") and
//! the failure is logged once. The funnel treats such a record as unique.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;

use super::hasher::{Hash, Hasher, HEAD_SIZE};

/// A discovered file plus its lazily computed digests.
#[derive(Debug, Serialize)]
pub struct FileRecord {
    /// Path under the resolved (symlink-free) root
    pub path: PathBuf,
    /// Size in bytes at discovery time
    pub size: u64,
    /// Inherited from the root the file was found under
    pub is_reference: bool,
    /// Global discovery position across all roots (0-based)
    pub index: usize,
    #[serde(skip)]
    head: OnceLock<Option<Hash>>,
    #[serde(skip)]
    full: OnceLock<Option<Hash>>,
}

impl FileRecord {
    /// Create a record with empty digest caches.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, is_reference: bool, index: usize) -> Self {
        Self {
            path,
            size,
            is_reference,
            index,
            head: OnceLock::new(),
            full: OnceLock::new(),
        }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Digest of the first [`HEAD_SIZE`] bytes, or `None` if unreadable.
    pub fn head_hash(&self, hasher: &Hasher) -> Option<Hash> {
        *self.head.get_or_init(|| {
            match hasher.head_hash(&self.path, self.size) {
                Ok(hash) => {
                    log::trace!("Head hash computed: {}", self.path.display());
                    Some(hash)
                }
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", self.path.display(), e);
                    None
                }
            }
        })
    }

    /// Digest of the whole content, or `None` if unreadable.
    ///
    /// Files no larger than [`HEAD_SIZE`] reuse the head digest instead of
    /// reading the file again.
    pub fn full_hash(&self, hasher: &Hasher) -> Option<Hash> {
        if self.size <= HEAD_SIZE {
            return self.head_hash(hasher);
        }
        *self.full.get_or_init(|| match hasher.full_hash(&self.path) {
            Ok(hash) => {
                log::trace!("Full hash computed: {}", self.path.display());
                Some(hash)
            }
            Err(e) => {
                log::warn!("Failed to hash {}: {}", self.path.display(), e);
                None
            }
        })
    }

    /// Whether the head digest has been computed (successfully or not).
    #[must_use]
    pub fn head_computed(&self) -> bool {
        self.head.get().is_some()
    }

    /// Whether the full digest has been computed (successfully or not).
    ///
    /// Always mirrors [`head_computed`](Self::head_computed) for files that
    /// fit in the head window.
    #[must_use]
    pub fn full_computed(&self) -> bool {
        if self.size <= HEAD_SIZE {
            self.head_computed()
        } else {
            self.full.get().is_some()
        }
    }
}
