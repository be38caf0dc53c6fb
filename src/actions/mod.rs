//! File actions module.
//!
//! This module turns confirmed duplicate groups into filesystem changes:
//! - [`plan`]: keep/delete policy per group
//! - [`delete`]: permanent or trash deletion with safety re-checks and dry-run
//! - [`reap`]: bottom-up removal of directories left empty
//!
//! ```no_run
//! use dupetrim::actions::{execute, DeleteConfig, DeletionPlanner};
//! use dupetrim::duplicates::DuplicateGroup;
//!
//! let groups: Vec<DuplicateGroup> = Vec::new();
//! let plan = DeletionPlanner::new().plan(&groups);
//! let result = execute(&plan, &DeleteConfig::dry_run(), |_| {});
//! println!("{}", result.summary());
//! ```

pub mod delete;
pub mod plan;
pub mod reap;

// Re-export commonly used types
pub use delete::{
    delete_to_trash, execute, execute_group, permanent_delete, validate_group, verify_unchanged,
    BatchDeleteResult, DeleteConfig, DeleteError, DeleteResult, FileDecision,
};
pub use plan::{DeletionPlan, DeletionPlanner, GroupPlan, PlannedFile};
pub use reap::EmptyDirectoryReaper;
