//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing reference and
//! candidate roots and producing [`FileRecord`]s for duplicate detection.
//!
//! # Ordering
//!
//! Discovery order decides which copy of a duplicate survives, so it is
//! fully specified:
//!
//! - reference roots first, in the order supplied
//! - then candidate roots, in the order supplied
//! - depth-first within a root, children sorted by file name
//!
//! # Directory Deduplication
//!
//! Every directory entered (roots included) is recorded by its
//! (device, inode) identity. A directory reached again through another
//! logical path (bind mount, followed symlink, nested root) is skipped
//! together with its subtree and counted as discarded.
//!
//! # Errors
//!
//! Root resolution failures and enumeration failures inside a root are fatal:
//! the iterator yields one [`ScanError`] and then ends. A file whose metadata
//! cannot be read is logged and skipped.
//!
//! # Example
//!
//! ```no_run
//! use dupetrim::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(
//!     vec![PathBuf::from("/backup")],
//!     vec![PathBuf::from("/home/user/Downloads")],
//!     WalkerConfig::default(),
//! );
//!
//! let mut walk = walker.walk();
//! let files: Result<Vec<_>, _> = walk.by_ref().collect();
//! println!("{} directories discarded", walk.discarded_dirs());
//! ```

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::identity::{DirectoryIdentity, VisitedDirectories};
use super::{FileRecord, ScanError, ScanRoot, WalkerConfig};

/// Directory walker over an ordered set of roots.
#[derive(Debug)]
pub struct Walker {
    /// Roots in traversal order (references first)
    roots: Vec<ScanRoot>,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker for reference and candidate roots.
    ///
    /// # Arguments
    ///
    /// * `reference_roots` - Protected roots, scanned first in this order
    /// * `candidate_roots` - Roots whose duplicates may be removed, scanned next
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(
        reference_roots: Vec<PathBuf>,
        candidate_roots: Vec<PathBuf>,
        config: WalkerConfig,
    ) -> Self {
        let roots = reference_roots
            .into_iter()
            .map(ScanRoot::reference)
            .chain(candidate_roots.into_iter().map(ScanRoot::candidate))
            .collect();
        Self { roots, config }
    }

    /// Create a walker from tagged roots.
    ///
    /// Reference roots are moved ahead of candidate roots; relative order
    /// within each kind is kept.
    #[must_use]
    pub fn from_roots(roots: Vec<ScanRoot>, config: WalkerConfig) -> Self {
        let (mut ordered, candidates): (Vec<_>, Vec<_>) =
            roots.into_iter().partition(|r| r.is_reference);
        ordered.extend(candidates);
        Self {
            roots: ordered,
            config,
        }
    }

    /// Roots in traversal order.
    #[must_use]
    pub fn roots(&self) -> &[ScanRoot] {
        &self.roots
    }

    /// Start the traversal.
    ///
    /// Consumes the walker: the returned sequence can be iterated exactly
    /// once and cannot be restarted.
    #[must_use]
    pub fn walk(self) -> Walk {
        Walk {
            pending: self.roots.into_iter(),
            current: None,
            follow_symlinks: self.config.follow_symlinks,
            visited: VisitedDirectories::new(),
            resolved: Vec::new(),
            next_index: 0,
            discarded_dirs: 0,
            skipped_files: 0,
            finished: false,
        }
    }
}

/// Single-pass file sequence produced by [`Walker::walk`].
///
/// Yields [`FileRecord`]s in discovery order. After a fatal error has been
/// yielded the sequence is exhausted.
pub struct Walk {
    pending: std::vec::IntoIter<ScanRoot>,
    current: Option<(ScanRoot, walkdir::IntoIter)>,
    follow_symlinks: bool,
    visited: VisitedDirectories,
    resolved: Vec<ScanRoot>,
    next_index: usize,
    discarded_dirs: u64,
    skipped_files: u64,
    finished: bool,
}

impl std::fmt::Debug for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("current", &self.current.as_ref().map(|(root, _)| root))
            .field("follow_symlinks", &self.follow_symlinks)
            .field("resolved", &self.resolved)
            .field("next_index", &self.next_index)
            .field("discarded_dirs", &self.discarded_dirs)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Walk {
    /// Directories skipped because their identity was already visited.
    #[must_use]
    pub fn discarded_dirs(&self) -> u64 {
        self.discarded_dirs
    }

    /// Files yielded so far.
    #[must_use]
    pub fn total_files(&self) -> u64 {
        self.next_index as u64
    }

    /// Files skipped because their metadata could not be read.
    #[must_use]
    pub fn skipped_files(&self) -> u64 {
        self.skipped_files
    }

    /// Roots resolved so far, in their physical form.
    #[must_use]
    pub fn resolved_roots(&self) -> &[ScanRoot] {
        &self.resolved
    }

    /// Begin the next pending root, if any.
    fn start_next_root(&mut self) -> Option<Result<(), ScanError>> {
        let root = self.pending.next()?;
        match root.resolve() {
            Ok(resolved) => {
                log::info!(
                    "Scanning {} root {}",
                    if resolved.is_reference {
                        "reference"
                    } else {
                        "candidate"
                    },
                    resolved.path.display()
                );
                let iter = WalkDir::new(&resolved.path)
                    .follow_links(self.follow_symlinks)
                    .sort_by_file_name()
                    .into_iter();
                self.resolved.push(resolved.clone());
                self.current = Some((resolved, iter));
                Some(Ok(()))
            }
            Err(e) => {
                log::error!("{}", e);
                Some(Err(e))
            }
        }
    }

    fn fail(&mut self, error: ScanError) -> Option<Result<FileRecord, ScanError>> {
        log::error!("{}", error);
        self.finished = true;
        self.current = None;
        Some(Err(error))
    }
}

impl Iterator for Walk {
    type Item = Result<FileRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.current.is_none() {
                match self.start_next_root() {
                    None => {
                        self.finished = true;
                        return None;
                    }
                    Some(Ok(())) => {}
                    Some(Err(e)) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                }
            }

            let Some((root, iter)) = self.current.as_mut() else {
                continue;
            };

            let entry = match iter.next() {
                None => {
                    log::debug!("Finished root {}", root.path.display());
                    self.current = None;
                    continue;
                }
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    if let Some(ancestor) = err.loop_ancestor() {
                        log::debug!(
                            "Symlink loop back to {} at {}, discarding",
                            ancestor.display(),
                            err.path().unwrap_or(&root.path).display()
                        );
                        self.discarded_dirs += 1;
                        continue;
                    }
                    if is_dangling_symlink(&err) {
                        log::debug!(
                            "Skipping dangling symlink: {}",
                            err.path().unwrap_or(&root.path).display()
                        );
                        continue;
                    }
                    let path = err
                        .path()
                        .map_or_else(|| root.path.clone(), Path::to_path_buf);
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("directory walk failed"));
                    return self.fail(ScanError::DirectoryScan { path, source });
                }
            };

            let file_type = entry.file_type();

            if file_type.is_dir() {
                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(err) => {
                        let path = entry.path().to_path_buf();
                        let source = err
                            .into_io_error()
                            .unwrap_or_else(|| io::Error::other("cannot stat directory"));
                        return self.fail(ScanError::DirectoryScan { path, source });
                    }
                };
                let identity = DirectoryIdentity::from_metadata(&metadata);
                if !self.visited.mark_visited(identity) {
                    log::debug!(
                        "Skipping already visited directory: {}",
                        entry.path().display()
                    );
                    self.discarded_dirs += 1;
                    iter.skip_current_dir();
                }
                continue;
            }

            if !file_type.is_file() {
                log::trace!("Skipping non-regular entry: {}", entry.path().display());
                continue;
            }

            if entry.path_is_symlink() {
                log::trace!("Skipping symlinked file: {}", entry.path().display());
                continue;
            }

            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => {
                    log::warn!("Cannot read metadata for {}: {}", entry.path().display(), e);
                    self.skipped_files += 1;
                    continue;
                }
            };

            let record = FileRecord::new(entry.into_path(), size, root.is_reference, self.next_index);
            self.next_index += 1;
            log::trace!("Discovered {} ({} bytes)", record.path.display(), record.size);
            return Some(Ok(record));
        }
    }
}

impl std::iter::FusedIterator for Walk {}

/// Whether a walk error comes from following a symlink whose target is gone.
fn is_dangling_symlink(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
    not_found
        && err
            .path()
            .and_then(|p| std::fs::symlink_metadata(p).ok())
            .is_some_and(|m| m.file_type().is_symlink())
}
