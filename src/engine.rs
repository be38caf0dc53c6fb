//! Run orchestration.
//!
//! [`run`] drives the whole pipeline for one invocation:
//!
//! 1. Validate roots
//! 2. Walk reference roots, then candidate roots
//! 3. Group by size, head hash and full hash
//! 4. Plan deletions
//! 5. Delete (or simulate in a dry run)
//! 6. Reap directories left empty
//!
//! Decisions are streamed to a [`RunObserver`] as they are made and also
//! returned in the [`RunOutcome`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::actions::{
    execute_group, BatchDeleteResult, DeleteConfig, DeletionPlan, DeletionPlanner,
    EmptyDirectoryReaper, FileDecision,
};
use crate::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig};
use crate::scanner::{ScanError, ScanRoot, Walker, WalkerConfig};
use crate::stats::RunStatistics;

/// Options recognized by a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Leave directories emptied by deletion in place
    pub keep_empty: bool,
    /// Report the plan without modifying the filesystem
    pub dry_run: bool,
    /// Move deleted files to the system trash
    pub use_trash: bool,
    /// Worker threads used for hashing
    pub io_threads: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            keep_empty: false,
            dry_run: false,
            use_trash: false,
            io_threads: 4,
        }
    }
}

/// Input of a single run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Protected roots, scanned first
    pub reference_roots: Vec<PathBuf>,
    /// Roots whose duplicates may be removed
    pub candidate_roots: Vec<PathBuf>,
    /// Run options
    pub options: RunOptions,
}

impl RunRequest {
    /// Create a request with default options.
    #[must_use]
    pub fn new(reference_roots: Vec<PathBuf>, candidate_roots: Vec<PathBuf>) -> Self {
        Self {
            reference_roots,
            candidate_roots,
            options: RunOptions::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Check every root before the walk starts.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoCandidates`] or the first invalid root.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.candidate_roots.is_empty() {
            return Err(RunError::NoCandidates);
        }
        for path in self.reference_roots.iter().chain(&self.candidate_roots) {
            ScanRoot::candidate(path.as_path()).validate()?;
        }
        Ok(())
    }
}

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    /// Counters for the run
    pub stats: RunStatistics,
    /// Keep/delete partition of every duplicate group
    pub plan: DeletionPlan,
    /// Per-file decisions in plan order
    pub decisions: Vec<FileDecision>,
    /// Directories removed (or that would be removed)
    pub removed_dirs: Vec<PathBuf>,
    /// Whether the run was a dry run
    pub dry_run: bool,
}

impl RunOutcome {
    /// Whether any duplicate group was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.plan.groups.is_empty()
    }
}

/// Receives decisions while a run is in progress.
///
/// All methods default to doing nothing.
pub trait RunObserver {
    /// A duplicate group was confirmed.
    fn on_group(&self, _group: &DuplicateGroup) {}

    /// A file was kept, deleted or failed to delete.
    fn on_file_decision(&self, _decision: &FileDecision) {}

    /// A directory was removed.
    fn on_dir_removed(&self, _path: &Path, _dry_run: bool) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Fatal errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// No candidate roots were given.
    #[error("no candidate directories given")]
    NoCandidates,

    /// A root was invalid or the walk failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Run the full pipeline.
///
/// # Errors
///
/// Returns [`RunError`] for invalid roots, unresolvable roots and
/// enumeration failures. Per-file hashing and deletion failures are not
/// errors; they are counted in the statistics.
pub fn run(request: &RunRequest, observer: &dyn RunObserver) -> Result<RunOutcome, RunError> {
    request.validate()?;
    let options = &request.options;
    let mut stats = RunStatistics::default();

    log::info!(
        "Starting run: {} reference root(s), {} candidate root(s){}",
        request.reference_roots.len(),
        request.candidate_roots.len(),
        if options.dry_run { " (dry run)" } else { "" }
    );

    let walker = Walker::new(
        request.reference_roots.clone(),
        request.candidate_roots.clone(),
        WalkerConfig::new(options.follow_symlinks),
    );
    let mut walk = walker.walk();
    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(options.io_threads));

    let groups = finder.find_duplicates(walk.by_ref(), &mut stats)?;
    stats.discarded_dirs += walk.discarded_dirs();
    stats.total_files += walk.total_files();
    stats.file_errors += walk.skipped_files();

    let plan = DeletionPlanner::new().plan(&groups);

    let delete_config = DeleteConfig::default()
        .with_dry_run(options.dry_run)
        .with_trash(options.use_trash);
    let mut result = BatchDeleteResult::new(options.dry_run);
    for (group, group_plan) in groups.iter().zip(&plan.groups) {
        observer.on_group(group);
        execute_group(group_plan, &delete_config, &mut result, |d| {
            observer.on_file_decision(d);
        });
    }
    drop(groups);
    log::info!("{}", result.summary());
    stats.files_deleted += result.success_count() as u64;
    stats.bytes_reclaimed += result.bytes_freed;
    stats.deletion_failures += result.failure_count() as u64;

    let (references, candidates): (Vec<_>, Vec<_>) = walk
        .resolved_roots()
        .iter()
        .partition(|r| r.is_reference);
    let reaper = EmptyDirectoryReaper::new(
        references.into_iter().map(|r| r.path.clone()).collect(),
        candidates.into_iter().map(|r| r.path.clone()).collect(),
        options.dry_run,
    );
    let removed_dirs = reaper.reap(&plan.affected_dirs, options.keep_empty, &result.removed_paths());
    for dir in &removed_dirs {
        observer.on_dir_removed(dir, options.dry_run);
    }
    stats.dirs_removed += removed_dirs.len() as u64;

    log::info!(
        "Run complete: {} files, {} duplicate groups, {} deleted, {} directories removed",
        stats.total_files,
        stats.duplicate_groups,
        stats.files_deleted,
        stats.dirs_removed
    );

    Ok(RunOutcome {
        stats,
        plan,
        decisions: result.decisions,
        removed_dirs,
        dry_run: options.dry_run,
    })
}
