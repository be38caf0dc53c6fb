//! dupetrim - Reference-Aware Duplicate File Remover
//!
//! Finds byte-identical files under a set of candidate directories using a
//! size → head hash → full hash funnel (BLAKE3), keeps the first copy found
//! and every copy under a protected reference directory, deletes the rest
//! and removes directories left empty.
//!
//! The library entry point is [`engine::run`]; [`run_app`] adds the
//! command-line surface on top of it.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod stats;

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};

pub use engine::{run, NullObserver, RunObserver, RunOptions, RunOutcome, RunRequest};
pub use stats::RunStatistics;

use cli::{Cli, OutputFormat};
use config::Settings;
use error::ExitCode;
use output::{JsonOutput, TextReporter};

/// Run the command-line application.
///
/// # Errors
///
/// Returns an error for invalid configuration and for fatal run errors
/// (invalid or unresolvable roots, enumeration failures).
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    let settings = Settings::from_cli(&cli)?;
    log::debug!("Effective settings: {:?}", settings);

    if cli.show_config {
        print!("{}", settings.to_toml()?);
        return Ok(ExitCode::Success);
    }

    let request = RunRequest {
        reference_roots: cli.reference_paths,
        candidate_roots: cli.paths,
        options: settings.run_options(),
    };

    let exit_code = match settings.output {
        OutputFormat::Text if cli.quiet => {
            let outcome = run(&request, &NullObserver)?;
            ExitCode::from_stats(&outcome.stats)
        }
        OutputFormat::Text => {
            let reporter = TextReporter::stdout();
            let outcome = run(&request, &reporter)?;
            reporter
                .write_summary(&outcome)
                .context("Failed to write report")?;
            ExitCode::from_stats(&outcome.stats)
        }
        OutputFormat::Json => {
            let outcome = run(&request, &NullObserver)?;
            let exit_code = ExitCode::from_stats(&outcome.stats);
            JsonOutput::new(&outcome, exit_code)
                .write_to(io::stdout().lock())
                .context("Failed to write JSON report")?;
            exit_code
        }
    };

    Ok(exit_code)
}
