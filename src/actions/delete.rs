//! Deletion of planned duplicates.
//!
//! # Overview
//!
//! This module carries out a [`DeletionPlan`]:
//! - Permanent deletion (default) or move to system trash
//! - Dry-run mode that reports what would happen without touching anything
//! - Safety re-checks on every group before any file is removed
//! - TOCTOU verification of each file's size before deletion
//!
//! # Safety
//!
//! A group whose plan would delete a reference file, or would leave no copy
//! behind, is refused as a whole. Individual failures never stop the batch.
//!
//! # Example
//!
//! ```no_run
//! use dupetrim::actions::delete::{execute, DeleteConfig};
//! use dupetrim::actions::DeletionPlan;
//!
//! let plan = DeletionPlan::default();
//! let result = execute(&plan, &DeleteConfig::dry_run(), |decision| {
//!     println!("{}: {}", decision.label(), decision.path().display());
//! });
//! println!("{}", result.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::plan::{DeletionPlan, GroupPlan, PlannedFile};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan (TOCTOU protection).
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// File lives under a reference root.
    #[error("refusing to delete reference file: {0}")]
    ReferenceProtected(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::ReferenceProtected(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }
}

fn stat_error(path: &Path, e: io::Error) -> DeleteError {
    match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// What happened to one group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FileDecision {
    /// Kept on disk.
    Retained {
        path: PathBuf,
        size: u64,
        is_reference: bool,
    },
    /// Removed, or would be removed in a dry run.
    Deleted {
        path: PathBuf,
        size: u64,
        dry_run: bool,
    },
    /// Planned for deletion but left in place.
    Failed { path: PathBuf, error: String },
}

impl FileDecision {
    /// Path the decision refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Retained { path, .. } | Self::Deleted { path, .. } | Self::Failed { path, .. } => {
                path
            }
        }
    }

    /// Short label for display.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retained { .. } => "keep",
            Self::Deleted { dry_run: false, .. } => "delete",
            Self::Deleted { dry_run: true, .. } => "would delete",
            Self::Failed { .. } => "failed",
        }
    }

    /// Whether the file is (or would be) gone after this decision.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Every decision, in group order then discovery order.
    pub decisions: Vec<FileDecision>,
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl BatchDeleteResult {
    /// Create an empty result.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Paths that are gone (or would be gone in a dry run).
    #[must_use]
    pub fn removed_paths(&self) -> HashSet<PathBuf> {
        self.successes.iter().map(|s| s.path.clone()).collect()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "Would delete" } else { "Deleted" };
        if self.all_succeeded() {
            format!(
                "{} {} file(s), {} bytes",
                verb,
                self.success_count(),
                self.bytes_freed
            )
        } else {
            format!(
                "{} {} file(s), {} failed, {} bytes",
                verb,
                self.success_count(),
                self.failure_count(),
                self.bytes_freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    /// Report decisions without touching the filesystem.
    pub dry_run: bool,
    /// Move files to the system trash instead of unlinking them.
    pub use_trash: bool,
}

impl DeleteConfig {
    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self::default()
    }

    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            use_trash: true,
            ..Self::default()
        }
    }

    /// Create config for a dry run.
    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Enable/disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable/disable trash mode.
    #[must_use]
    pub fn with_trash(mut self, use_trash: bool) -> Self {
        self.use_trash = use_trash;
        self
    }
}

/// Verify that a file still has the size recorded at scan time.
///
/// # Errors
///
/// Returns `Modified` if the size changed, or a stat error if the file is
/// gone or unreadable.
pub fn verify_unchanged(path: &Path, expected_size: u64) -> Result<(), DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| stat_error(path, e))?;
    if !metadata.is_file() || metadata.len() != expected_size {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            path.display(),
            expected_size,
            metadata.len()
        );
        return Err(DeleteError::Modified(path.to_path_buf()));
    }
    Ok(())
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path).map_err(|e| stat_error(path, e))?.len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path).map_err(|e| stat_error(path, e))?.len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Check a group plan before anything in it is deleted.
///
/// # Errors
///
/// - `ReferenceProtected` if a reference file is marked for deletion
/// - `AllCopiesWouldBeDeleted` if nothing would be retained
pub fn validate_group(group: &GroupPlan) -> Result<(), DeleteError> {
    if let Some(reference) = group.to_delete.iter().find(|f| f.is_reference) {
        log::error!(
            "Deletion plan marks reference file {} for deletion",
            reference.path.display()
        );
        return Err(DeleteError::ReferenceProtected(reference.path.clone()));
    }
    if group.retained.is_empty() && !group.to_delete.is_empty() {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group.to_delete.len()
        );
        return Err(DeleteError::AllCopiesWouldBeDeleted);
    }
    Ok(())
}

fn delete_one(file: &PlannedFile, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    verify_unchanged(&file.path, file.size)?;

    if config.dry_run {
        log::debug!("Would delete: {}", file.path.display());
        return Ok(DeleteResult::new(file.path.clone(), file.size, !config.use_trash));
    }

    if config.use_trash {
        delete_to_trash(&file.path)
    } else {
        permanent_delete(&file.path)
    }
}

/// Execute one group of a deletion plan, accumulating into `result`.
///
/// The group is validated first; a refused group reports every planned
/// deletion as failed and touches nothing.
pub fn execute_group<F>(
    group: &GroupPlan,
    config: &DeleteConfig,
    result: &mut BatchDeleteResult,
    mut on_decision: F,
) where
    F: FnMut(&FileDecision),
{
    let refusal = validate_group(group).err().map(|e| e.to_string());

    for (file, marked) in group.members() {
        let decision = if !marked {
            FileDecision::Retained {
                path: file.path.clone(),
                size: file.size,
                is_reference: file.is_reference,
            }
        } else if let Some(error) = &refusal {
            result.failures.push((file.path.clone(), error.clone()));
            FileDecision::Failed {
                path: file.path.clone(),
                error: error.clone(),
            }
        } else {
            match delete_one(file, config) {
                Ok(del) => {
                    result.bytes_freed += del.size;
                    result.successes.push(del);
                    FileDecision::Deleted {
                        path: file.path.clone(),
                        size: file.size,
                        dry_run: config.dry_run,
                    }
                }
                Err(e) => {
                    let error = e.to_string();
                    log::warn!("Failed to delete {}: {}", file.path.display(), error);
                    result.failures.push((file.path.clone(), error.clone()));
                    FileDecision::Failed {
                        path: file.path.clone(),
                        error,
                    }
                }
            }
        };

        on_decision(&decision);
        result.decisions.push(decision);
    }
}

/// Execute a deletion plan.
///
/// Decisions are passed to `on_decision` as they are made, group by group,
/// members in discovery order.
pub fn execute<F>(plan: &DeletionPlan, config: &DeleteConfig, mut on_decision: F) -> BatchDeleteResult
where
    F: FnMut(&FileDecision),
{
    let mut result = BatchDeleteResult::new(config.dry_run);
    for group in &plan.groups {
        execute_group(group, config, &mut result, &mut on_decision);
    }
    log::info!("{}", result.summary());
    result
}
