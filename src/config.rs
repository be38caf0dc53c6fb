//! Layered configuration.
//!
//! Settings are merged with `figment`, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config <FILE>`, or `config.toml` in the platform config
//!    directory when it exists
//! 3. Environment variables prefixed with `DUPETRIM_` (e.g. `DUPETRIM_IO_THREADS=8`)
//! 4. Command-line flags
//!
//! ```toml
//! follow_symlinks = false
//! keep_empty = false
//! dry_run = true
//! trash = true
//! io_threads = 4
//! output = "text"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::engine::RunOptions;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPETRIM_";

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Leave emptied directories in place
    pub keep_empty: bool,
    /// Report without modifying the filesystem
    pub dry_run: bool,
    /// Move deleted files to the system trash
    pub trash: bool,
    /// Worker threads for hashing
    pub io_threads: usize,
    /// Report format
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            keep_empty: false,
            dry_run: false,
            trash: false,
            io_threads: 4,
            output: OutputFormat::Text,
        }
    }
}

impl Settings {
    /// Platform-specific default configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupetrim").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the defaults, file and environment layers.
    ///
    /// An explicit `config_file` must exist; the default path is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit configuration file does not exist.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    bail!("Configuration file not found: {}", path.display());
                }
                log::debug!("Loading configuration from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading configuration from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load settings from defaults, file and environment.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing explicit file, malformed TOML, values
    /// of the wrong type or an invalid thread count.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let settings: Self = Self::figment(config_file)?
            .extract()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load all layers, then apply command-line flags.
    ///
    /// # Errors
    ///
    /// See [`Settings::load`].
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut settings = Self::load(cli.config.as_deref())?;
        settings.apply_cli(cli);
        Ok(settings)
    }

    /// Apply command-line flags on top of loaded settings.
    ///
    /// Boolean flags can only switch a setting on.
    pub fn apply_cli(&mut self, cli: &Cli) {
        self.follow_symlinks |= cli.follow_symlinks;
        self.keep_empty |= cli.keep_empty;
        self.dry_run |= cli.dry_run;
        self.trash |= cli.trash;
        if let Some(threads) = cli.io_threads {
            self.io_threads = usize::from(threads);
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if `io_threads` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.io_threads == 0 {
            bail!("io_threads must be at least 1");
        }
        Ok(())
    }

    /// Run options derived from these settings.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            follow_symlinks: self.follow_symlinks,
            keep_empty: self.keep_empty,
            dry_run: self.dry_run,
            use_trash: self.trash,
            io_threads: self.io_threads,
        }
    }

    /// Render the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
