//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module implements the grouping funnel:
//! 1. **Phase 1 - Size grouping**: bucket by exact size, no I/O
//! 2. **Phase 2 - Head hash**: hash the first 32 KiB of same-size files
//! 3. **Phase 3 - Full hash**: hash the entire content of head-hash matches
//!
//! Each phase consumes the full output of the previous one and drops
//! singleton buckets before the next, so a file is only read as far as needed
//! to prove it unique.
//!
//! Digests for a phase are computed up front on a bounded rayon pool and
//! memoized on the records; bucketing then runs sequentially in discovery
//! order. Grouping therefore depends only on digest values, never on the
//! order in which hashing finished.
//!
//! # Example
//!
//! ```no_run
//! use dupetrim::duplicates::{DuplicateFinder, FinderConfig};
//! use dupetrim::scanner::{Walker, WalkerConfig};
//! use dupetrim::RunStatistics;
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![], vec![PathBuf::from(".")], WalkerConfig::default());
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//!
//! let mut stats = RunStatistics::default();
//! let groups = finder.find_duplicates(walker.walk(), &mut stats).unwrap();
//! println!("{} duplicate groups", groups.len());
//! ```

use std::convert::Infallible;

use rayon::prelude::*;

use super::groups::{bucket_by, sort_by_discovery, DuplicateGroup, HeadGroup, SizeGroup};
use crate::scanner::{FileRecord, Hasher};
use crate::stats::RunStatistics;

/// Configuration for the duplicate finder.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self { io_threads: 4 }
    }
}

impl FinderConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// Single forward pass over `files`. Singleton sizes are counted in
/// `discarded_unique_size` and dropped; `distinct_sizes` counts every size
/// bucket. Zero-byte files are grouped like any other size.
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
    stats: &mut RunStatistics,
) -> Vec<SizeGroup> {
    match try_group_by_size(files.into_iter().map(Ok::<_, Infallible>), stats) {
        Ok(groups) => groups,
        Err(never) => match never {},
    }
}

/// Fallible variant of [`group_by_size`] that stops at the first error.
///
/// # Errors
///
/// Returns the first error yielded by `files`; nothing after it is consumed.
pub fn try_group_by_size<E>(
    files: impl IntoIterator<Item = Result<FileRecord, E>>,
    stats: &mut RunStatistics,
) -> Result<Vec<SizeGroup>, E> {
    let mut records = Vec::new();
    for file in files {
        records.push(file?);
    }

    let buckets = bucket_by(records, |f| Some(f.size), |_| {});
    stats.distinct_sizes += buckets.len() as u64;

    let groups: Vec<SizeGroup> = buckets
        .into_iter()
        .filter_map(|(size, files)| {
            if files.len() == 1 {
                stats.discarded_unique_size += 1;
                log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
                None
            } else {
                log::debug!("Size group {} bytes: {} potential duplicates", size, files.len());
                Some(SizeGroup::with_files(size, files))
            }
        })
        .collect();

    log::info!(
        "Phase 1 complete: {} sizes, {} groups, {} files eliminated",
        stats.distinct_sizes,
        groups.len(),
        stats.discarded_unique_size
    );

    Ok(groups)
}

/// Duplicate finder that runs the three-phase funnel.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .field("pool", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    ///
    /// If the dedicated I/O pool cannot be built, hashing falls back to the
    /// global rayon pool.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.io_threads)
            .thread_name(|i| format!("dupetrim-io-{}", i))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!(
                    "Failed to create I/O thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                None
            }
        };
        Self {
            config,
            hasher: Hasher::new(),
            pool,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Run `op` on the dedicated pool if available.
    fn install<OP: FnOnce() + Send>(&self, op: OP) {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Run the full funnel over a file sequence.
    ///
    /// `files` is consumed exactly once. The first error aborts the funnel
    /// before any hashing happens.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `files`.
    pub fn find_duplicates<E>(
        &self,
        files: impl IntoIterator<Item = Result<FileRecord, E>>,
        stats: &mut RunStatistics,
    ) -> Result<Vec<DuplicateGroup>, E> {
        let size_groups = try_group_by_size(files, stats)?;
        let head_groups = self.group_by_head_hash(size_groups, stats);
        let groups = self.group_by_full_hash(head_groups, stats);
        stats.duplicate_groups += groups.len() as u64;
        Ok(groups)
    }

    /// Phase 2: split size groups by head digest.
    ///
    /// Unreadable files are counted in `file_errors` and in
    /// `discarded_unique_head_hash`, like any other singleton.
    #[must_use]
    pub fn group_by_head_hash(
        &self,
        size_groups: Vec<SizeGroup>,
        stats: &mut RunStatistics,
    ) -> Vec<HeadGroup> {
        let input: usize = size_groups.iter().map(SizeGroup::len).sum();
        log::info!("Phase 2: Computing head hashes for {} files", input);

        let hasher = &self.hasher;
        self.install(|| {
            size_groups.par_iter().for_each(|group| {
                group.files.par_iter().for_each(|file| {
                    file.head_hash(hasher);
                });
            });
        });

        let mut out = Vec::new();
        for group in size_groups {
            let buckets = bucket_by(
                group.files,
                |f| f.head_hash(hasher),
                |_| {
                    stats.file_errors += 1;
                    stats.discarded_unique_head_hash += 1;
                },
            );
            for (head_hash, files) in buckets {
                if files.len() == 1 {
                    stats.discarded_unique_head_hash += 1;
                    log::trace!("Eliminated unique head hash: {}", files[0].path.display());
                } else {
                    out.push(HeadGroup {
                        size: group.size,
                        head_hash,
                        files,
                    });
                }
            }
        }
        sort_by_discovery(&mut out, |g| g.files[0].index);

        log::info!(
            "Phase 2 complete: {} groups, {} files eliminated",
            out.len(),
            stats.discarded_unique_head_hash
        );
        out
    }

    /// Phase 3: split head groups by full digest into confirmed duplicates.
    #[must_use]
    pub fn group_by_full_hash(
        &self,
        head_groups: Vec<HeadGroup>,
        stats: &mut RunStatistics,
    ) -> Vec<DuplicateGroup> {
        let input: usize = head_groups.iter().map(|g| g.files.len()).sum();
        log::info!("Phase 3: Computing full hashes for {} files", input);

        let hasher = &self.hasher;
        self.install(|| {
            head_groups.par_iter().for_each(|group| {
                group.files.par_iter().for_each(|file| {
                    file.full_hash(hasher);
                });
            });
        });

        let mut out = Vec::new();
        for group in head_groups {
            let buckets = bucket_by(
                group.files,
                |f| f.full_hash(hasher),
                |_| {
                    stats.file_errors += 1;
                    stats.discarded_unique_hash += 1;
                },
            );
            for (hash, files) in buckets {
                stats.full_hashes_seen += files.len() as u64;
                if files.len() == 1 {
                    stats.discarded_unique_hash += 1;
                    log::trace!("Eliminated unique hash: {}", files[0].path.display());
                } else {
                    log::debug!(
                        "Duplicate group {} bytes: {} files",
                        group.size,
                        files.len()
                    );
                    out.push(DuplicateGroup::new(hash, group.size, files));
                }
            }
        }
        sort_by_discovery(&mut out, |g| g.files[0].index);

        log::info!(
            "Phase 3 complete: {} duplicate groups, {} files eliminated",
            out.len(),
            stats.discarded_unique_hash
        );
        out
    }
}
