//! Deletion planning for confirmed duplicate groups.
//!
//! # Policy
//!
//! Members are considered in discovery order:
//! - the member at position 0 is always retained
//! - any later member found under a reference root is retained
//! - every other later member is marked for deletion
//!
//! The retained set can therefore hold more than one file. The parent
//! directory of every file marked for deletion is collected so the reaper
//! knows where to look for newly emptied directories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::duplicates::DuplicateGroup;
use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// A file as seen by the planner, detached from its digest cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFile {
    /// Absolute path
    pub path: PathBuf,
    /// Size recorded at scan time
    pub size: u64,
    /// Whether the file lives under a reference root
    pub is_reference: bool,
    /// Discovery index
    pub index: usize,
}

impl From<&FileRecord> for PlannedFile {
    fn from(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            size: record.size,
            is_reference: record.is_reference,
            index: record.index,
        }
    }
}

/// Keep/delete partition of one duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupPlan {
    /// Full-content digest shared by the group
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash,
    /// Size of every member
    pub size: u64,
    /// Files kept, in discovery order
    pub retained: Vec<PlannedFile>,
    /// Files to remove, in discovery order
    pub to_delete: Vec<PlannedFile>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl GroupPlan {
    /// Bytes freed if every planned deletion succeeds.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * self.to_delete.len() as u64
    }

    /// All members of the group merged back into discovery order.
    #[must_use]
    pub fn members(&self) -> Vec<(&PlannedFile, bool)> {
        let mut members: Vec<_> = self
            .retained
            .iter()
            .map(|f| (f, false))
            .chain(self.to_delete.iter().map(|f| (f, true)))
            .collect();
        members.sort_by_key(|(f, _)| f.index);
        members
    }
}

/// The complete deletion plan for a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionPlan {
    /// One entry per duplicate group, in group order
    pub groups: Vec<GroupPlan>,
    /// Parent directories of files marked for deletion
    pub affected_dirs: BTreeSet<PathBuf>,
}

impl DeletionPlan {
    /// Check if the plan deletes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.to_delete.is_empty())
    }

    /// Number of files marked for deletion.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.groups.iter().map(|g| g.to_delete.len()).sum()
    }

    /// Number of files retained.
    #[must_use]
    pub fn retain_count(&self) -> usize {
        self.groups.iter().map(|g| g.retained.len()).sum()
    }

    /// Bytes freed if every planned deletion succeeds.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.groups.iter().map(GroupPlan::reclaimable_bytes).sum()
    }

    /// Check whether a path is marked for deletion.
    #[must_use]
    pub fn is_marked(&self, path: &Path) -> bool {
        self.groups
            .iter()
            .flat_map(|g| &g.to_delete)
            .any(|f| f.path == path)
    }
}

/// Applies the keep/delete policy to duplicate groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionPlanner;

impl DeletionPlanner {
    /// Create a new planner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Plan a single group.
    #[must_use]
    pub fn plan_group(&self, group: &DuplicateGroup) -> GroupPlan {
        let mut retained = Vec::new();
        let mut to_delete = Vec::new();

        for (position, file) in group.files.iter().enumerate() {
            if position == 0 || file.is_reference {
                retained.push(PlannedFile::from(file));
            } else {
                to_delete.push(PlannedFile::from(file));
            }
        }

        GroupPlan {
            hash: group.hash,
            size: group.size,
            retained,
            to_delete,
        }
    }

    /// Plan every group and collect the affected directories.
    #[must_use]
    pub fn plan<'a>(&self, groups: impl IntoIterator<Item = &'a DuplicateGroup>) -> DeletionPlan {
        let mut plan = DeletionPlan::default();

        for group in groups {
            let group_plan = self.plan_group(group);
            for file in &group_plan.to_delete {
                if let Some(parent) = file.path.parent() {
                    plan.affected_dirs.insert(parent.to_path_buf());
                }
            }
            log::debug!(
                "Group {}: {} retained, {} to delete",
                &hash_to_hex(&group_plan.hash)[..16],
                group_plan.retained.len(),
                group_plan.to_delete.len()
            );
            plan.groups.push(group_plan);
        }

        log::info!(
            "Deletion plan: {} files in {} groups, {} directories affected",
            plan.delete_count(),
            plan.groups.len(),
            plan.affected_dirs.len()
        );

        plan
    }
}
