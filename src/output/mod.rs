//! Output formatters for run reports.
//!
//! - [`text`]: streaming, colored per-file decisions and a summary
//! - [`json`]: the whole run outcome as JSON for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupetrim::engine::{run, RunRequest};
//! use dupetrim::error::ExitCode;
//! use dupetrim::output::{JsonOutput, TextReporter};
//! use std::path::PathBuf;
//!
//! let request = RunRequest::new(vec![], vec![PathBuf::from(".")]);
//! let reporter = TextReporter::stdout();
//! let outcome = run(&request, &reporter).unwrap();
//! reporter.write_summary(&outcome).unwrap();
//!
//! let exit_code = ExitCode::from_stats(&outcome.stats);
//! println!("{}", JsonOutput::new(&outcome, exit_code).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::JsonOutput;
pub use text::TextReporter;
