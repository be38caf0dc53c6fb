//! Run statistics.
//!
//! [`RunStatistics`] is an explicit value: each pipeline stage fills in its
//! own counters and the engine merges them. Nothing is process-global, so two
//! runs in the same process never share counters.

use std::ops::AddAssign;

use serde::Serialize;

/// Counters collected during a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Directories skipped because they were already visited via another path
    pub discarded_dirs: u64,
    /// Regular files discovered by the walker
    pub total_files: u64,
    /// Files dropped because no other file had the same size
    pub discarded_unique_size: u64,
    /// Files dropped at the head-hash stage (unique or unreadable)
    pub discarded_unique_head_hash: u64,
    /// Files dropped at the full-hash stage (unique or unreadable)
    pub discarded_unique_hash: u64,
    /// Distinct file sizes seen
    pub distinct_sizes: u64,
    /// Full digests obtained in the last funnel stage; files within the head
    /// window count with their reused head digest
    pub full_hashes_seen: u64,
    /// Files that could not be stat'ed or read (non-fatal)
    pub file_errors: u64,
    /// Confirmed duplicate groups
    pub duplicate_groups: u64,
    /// Files deleted (or that would be deleted in a dry run)
    pub files_deleted: u64,
    /// Bytes freed (or that would be freed in a dry run)
    pub bytes_reclaimed: u64,
    /// Planned deletions that failed or were refused
    pub deletion_failures: u64,
    /// Directories removed (or that would be removed in a dry run)
    pub dirs_removed: u64,
}

impl RunStatistics {
    /// Field-wise sum of two statistics values.
    pub fn merge(&mut self, other: &Self) {
        self.discarded_dirs += other.discarded_dirs;
        self.total_files += other.total_files;
        self.discarded_unique_size += other.discarded_unique_size;
        self.discarded_unique_head_hash += other.discarded_unique_head_hash;
        self.discarded_unique_hash += other.discarded_unique_hash;
        self.distinct_sizes += other.distinct_sizes;
        self.full_hashes_seen += other.full_hashes_seen;
        self.file_errors += other.file_errors;
        self.duplicate_groups += other.duplicate_groups;
        self.files_deleted += other.files_deleted;
        self.bytes_reclaimed += other.bytes_reclaimed;
        self.deletion_failures += other.deletion_failures;
        self.dirs_removed += other.dirs_removed;
    }

    /// Whether any non-fatal error happened during the run.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.file_errors > 0 || self.deletion_failures > 0
    }

    /// Files that survived every funnel stage.
    #[must_use]
    pub fn files_in_groups(&self) -> u64 {
        self.total_files
            .saturating_sub(self.discarded_unique_size)
            .saturating_sub(self.discarded_unique_head_hash)
            .saturating_sub(self.discarded_unique_hash)
    }
}

impl AddAssign for RunStatistics {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
