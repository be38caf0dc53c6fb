//! JSON run report.
//!
//! Serializes the full [`RunOutcome`] plus the exit code, for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "exit_code": 0,
//!   "exit_code_name": "DT000",
//!   "dry_run": true,
//!   "stats": { "total_files": 3, "duplicate_groups": 1, "...": 0 },
//!   "groups": [
//!     {
//!       "hash": "af1349b9...",
//!       "size": 10,
//!       "retained": [{ "path": "/ref/x.txt", "size": 10, "is_reference": true, "index": 0 }],
//!       "to_delete": [{ "path": "/data/a/x.txt", "size": 10, "is_reference": false, "index": 1 }]
//!     }
//!   ],
//!   "affected_dirs": ["/data/a"],
//!   "decisions": [{ "action": "retained", "path": "/ref/x.txt", "size": 10, "is_reference": true }],
//!   "removed_dirs": ["/data/a"]
//! }
//! ```

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::actions::{FileDecision, GroupPlan};
use crate::engine::RunOutcome;
use crate::error::ExitCode;
use crate::stats::RunStatistics;

/// JSON view of a run.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DT000")
    pub exit_code_name: &'static str,
    /// Whether nothing was modified
    pub dry_run: bool,
    /// Run counters
    pub stats: &'a RunStatistics,
    /// Per-group keep/delete partition
    pub groups: &'a [GroupPlan],
    /// Parent directories of planned deletions
    pub affected_dirs: &'a BTreeSet<PathBuf>,
    /// Per-file decisions
    pub decisions: &'a [FileDecision],
    /// Directories removed (or that would be removed)
    pub removed_dirs: &'a [PathBuf],
}

impl<'a> JsonOutput<'a> {
    /// Create a JSON view of an outcome.
    #[must_use]
    pub fn new(outcome: &'a RunOutcome, exit_code: ExitCode) -> Self {
        Self {
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
            dry_run: outcome.dry_run,
            stats: &outcome.stats,
            groups: &outcome.plan.groups,
            affected_dirs: &outcome.plan.affected_dirs,
            decisions: &outcome.decisions,
            removed_dirs: &outcome.removed_dirs,
        }
    }

    /// Compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::DeletionPlanner;
    use crate::duplicates::DuplicateGroup;
    use crate::scanner::FileRecord;

    fn outcome() -> RunOutcome {
        let group = DuplicateGroup::new(
            [0xab; 32],
            10,
            vec![
                FileRecord::new(PathBuf::from("/ref/x.txt"), 10, true, 0),
                FileRecord::new(PathBuf::from("/data/a/x.txt"), 10, false, 1),
            ],
        );
        let plan = DeletionPlanner::new().plan(&[group]);
        RunOutcome {
            stats: RunStatistics {
                total_files: 2,
                duplicate_groups: 1,
                files_deleted: 1,
                ..Default::default()
            },
            plan,
            decisions: vec![FileDecision::Deleted {
                path: PathBuf::from("/data/a/x.txt"),
                size: 10,
                dry_run: true,
            }],
            removed_dirs: vec![PathBuf::from("/data/a")],
            dry_run: true,
        }
    }

    #[test]
    fn test_json_schema() {
        let outcome = outcome();
        let output = JsonOutput::new(&outcome, ExitCode::Success);
        let value: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["exit_code_name"], "DT000");
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["stats"]["total_files"], 2);
        assert_eq!(value["groups"][0]["hash"], "ab".repeat(32));
        assert_eq!(value["groups"][0]["retained"][0]["path"], "/ref/x.txt");
        assert_eq!(value["groups"][0]["to_delete"][0]["is_reference"], false);
        assert_eq!(value["affected_dirs"][0], "/data/a");
        assert_eq!(value["decisions"][0]["action"], "deleted");
        assert_eq!(value["removed_dirs"][0], "/data/a");
    }

    #[test]
    fn test_write_to_ends_with_newline() {
        let outcome = outcome();
        let mut buf = Vec::new();
        JsonOutput::new(&outcome, ExitCode::Success)
            .write_to(&mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"stats\""));
    }
}
