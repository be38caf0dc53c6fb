//! Removal of directories emptied by deletion.
//!
//! Directories are visited deepest first so a child emptied and removed is
//! observed before its parent is considered. Removing a directory queues
//! its parent for the same check.
//!
//! Never touched:
//! - anything under a reference root
//! - anything outside every candidate root
//! - the candidate roots themselves
//! - any directory whose path passes through a symlink
//!
//! Emptiness ignores entries listed in the `gone` set, so a dry run reports
//! the same directories a real run would remove.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Bottom-up remover of empty directories.
#[derive(Debug, Clone)]
pub struct EmptyDirectoryReaper {
    reference_roots: Vec<PathBuf>,
    candidate_roots: Vec<PathBuf>,
    dry_run: bool,
}

impl EmptyDirectoryReaper {
    /// Create a reaper bounded by the given roots.
    ///
    /// Roots must be in the same (resolved) form as the directories later
    /// passed to [`reap`](Self::reap).
    #[must_use]
    pub fn new(reference_roots: Vec<PathBuf>, candidate_roots: Vec<PathBuf>, dry_run: bool) -> Self {
        Self {
            reference_roots,
            candidate_roots,
            dry_run,
        }
    }

    fn is_eligible(&self, dir: &Path) -> bool {
        if self.reference_roots.iter().any(|r| dir.starts_with(r)) {
            return false;
        }
        if !self
            .candidate_roots
            .iter()
            .any(|c| dir != c.as_path() && dir.starts_with(c))
        {
            return false;
        }
        is_physical(dir)
    }

    /// Remove affected directories that are empty after deletion.
    ///
    /// Returns removed directories in removal order. With `keep_empty` set
    /// nothing is removed.
    pub fn reap(
        &self,
        affected_dirs: &BTreeSet<PathBuf>,
        keep_empty: bool,
        gone: &HashSet<PathBuf>,
    ) -> Vec<PathBuf> {
        if keep_empty {
            log::debug!("Keeping empty directories");
            return Vec::new();
        }

        let mut gone = gone.clone();
        let mut work: BTreeSet<(Reverse<usize>, PathBuf)> = affected_dirs
            .iter()
            .filter(|d| self.is_eligible(d))
            .map(|d| (Reverse(d.components().count()), d.clone()))
            .collect();
        let mut removed = Vec::new();

        while let Some((_, dir)) = work.pop_first() {
            match is_empty_after(&dir, &gone) {
                Ok(true) => {}
                Ok(false) => {
                    log::trace!("Directory not empty: {}", dir.display());
                    continue;
                }
                Err(e) => {
                    log::warn!("Cannot read directory {}: {}", dir.display(), e);
                    continue;
                }
            }

            if self.dry_run {
                log::debug!("Would remove empty directory: {}", dir.display());
            } else if let Err(e) = fs::remove_dir(&dir) {
                log::warn!("Failed to remove directory {}: {}", dir.display(), e);
                continue;
            } else {
                log::info!("Removed empty directory: {}", dir.display());
            }

            if let Some(parent) = dir.parent() {
                if self.is_eligible(parent) {
                    work.insert((Reverse(parent.components().count()), parent.to_path_buf()));
                }
            }
            gone.insert(dir.clone());
            removed.push(dir);
        }

        removed
    }
}

/// Whether `dir` is its own physical path.
///
/// A directory reached through a followed symlink resolves elsewhere, so
/// removing it would touch a directory outside the candidate roots.
fn is_physical(dir: &Path) -> bool {
    match fs::canonicalize(dir) {
        Ok(resolved) if resolved == dir => true,
        Ok(resolved) => {
            log::debug!(
                "Not removing {}: resolves to {}",
                dir.display(),
                resolved.display()
            );
            false
        }
        Err(e) => {
            log::debug!("Cannot resolve {}: {}", dir.display(), e);
            false
        }
    }
}

/// Whether `dir` has no entries other than those in `gone`.
fn is_empty_after(dir: &Path, gone: &HashSet<PathBuf>) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        if !gone.contains(&entry?.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}
