//! Command-line interface definitions for dupetrim.
//!
//! # Example
//!
//! ```bash
//! # Preview what would be removed from two download folders,
//! # treating the photo archive as the source of truth
//! dupetrim --dry-run -r ~/Archive ~/Downloads ~/Desktop
//!
//! # Remove duplicates for real, moving them to the trash
//! dupetrim --trash -r ~/Archive ~/Downloads
//!
//! # Machine-readable report
//! dupetrim -n -o json ~/Downloads > plan.json
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Remove duplicate files, keeping reference copies.
///
/// Files are compared by size, then by a hash of their first 32 KiB, then by
/// a hash of their full content (BLAKE3). In each group of identical files
/// the first one found is kept, along with any copy under a reference
/// directory; the others are deleted. Directories left empty are removed.
#[derive(Debug, Parser)]
#[command(name = "dupetrim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Candidate directories; duplicates found here may be deleted
    #[arg(value_name = "PATH", required_unless_present = "show_config")]
    pub paths: Vec<PathBuf>,

    /// Reference directory; files here are never deleted (repeatable)
    ///
    /// Reference directories are scanned before candidate directories, so a
    /// reference copy is always the one kept.
    #[arg(short = 'r', long = "reference", value_name = "PATH")]
    pub reference_paths: Vec<PathBuf>,

    /// Descend into symlinked directories
    ///
    /// Directories reached twice (through links or bind mounts) are only
    /// scanned once.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Keep directories that become empty after deletion
    #[arg(long)]
    pub keep_empty: bool,

    /// Show what would be deleted without deleting anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Move deleted files to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Configuration file (TOML)
    ///
    /// If not specified, a default platform-specific path is used when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub show_config: bool,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable decisions and summary
    #[default]
    Text,
    /// Full run outcome as JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
