//! Exit codes and structured errors for the command-line surface.

use serde::Serialize;

use crate::stats::RunStatistics;

/// Process exit codes.
///
/// - 0: duplicates found and handled
/// - 1: fatal error (invalid root, unresolvable root, scan failure, bad config)
/// - 2: run completed, no duplicates found
/// - 3: run completed, but some files could not be read or deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were found and handled.
    Success = 0,
    /// An unexpected or fatal error occurred.
    GeneralError = 1,
    /// The run completed but found no duplicates.
    NoDuplicates = 2,
    /// The run completed with non-fatal file errors.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DT000",
            Self::GeneralError => "DT001",
            Self::NoDuplicates => "DT002",
            Self::PartialSuccess => "DT003",
        }
    }

    /// Exit code for a completed run.
    ///
    /// Non-fatal errors take precedence over the duplicate count.
    #[must_use]
    pub fn from_stats(stats: &RunStatistics) -> Self {
        if stats.has_errors() {
            Self::PartialSuccess
        } else if stats.duplicate_groups == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DT001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
