//! Human-readable run report.
//!
//! Decisions are printed as the run makes them, one line per file, grouped
//! under a header per duplicate group. A summary follows at the end.
//!
//! ```text
//! 3 identical files, 10 B each
//!   keep          /ref/x.txt (reference)
//!   would delete  /data/a/x.txt
//!   would delete  /data/b/x.txt
//!
//!   would rmdir   /data/a
//! ```
//!
//! Colors come from `yansi` and are disabled globally by `--no-color`.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::FileDecision;
use crate::duplicates::DuplicateGroup;
use crate::engine::{RunObserver, RunOutcome};

/// Streams decisions to a writer.
pub struct TextReporter<W: Write> {
    out: RefCell<W>,
    groups_seen: Cell<usize>,
    dirs_seen: Cell<usize>,
}

impl<W: Write> std::fmt::Debug for TextReporter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextReporter")
            .field("groups_seen", &self.groups_seen.get())
            .field("dirs_seen", &self.dirs_seen.get())
            .finish()
    }
}

impl TextReporter<io::Stdout> {
    /// Reporter writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextReporter<W> {
    /// Create a reporter over any writer.
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            groups_seen: Cell::new(0),
            dirs_seen: Cell::new(0),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn emit(&self, line: std::fmt::Arguments<'_>) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = out.write_fmt(line).and_then(|()| out.write_all(b"\n")) {
            log::debug!("Failed to write report line: {}", e);
        }
    }

    /// Print the end-of-run summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_summary(&self, outcome: &RunOutcome) -> io::Result<()> {
        let stats = &outcome.stats;
        let mut out = self.out.borrow_mut();

        writeln!(out)?;
        let title = if outcome.dry_run {
            "Summary (dry run)"
        } else {
            "Summary"
        };
        writeln!(out, "{}", title.bold())?;
        writeln!(out, "  Files scanned:         {}", stats.total_files)?;
        writeln!(
            out,
            "  Eliminated by size:    {}",
            stats.discarded_unique_size
        )?;
        writeln!(
            out,
            "  Eliminated by head:    {}",
            stats.discarded_unique_head_hash
        )?;
        writeln!(
            out,
            "  Eliminated by content: {}",
            stats.discarded_unique_hash
        )?;
        writeln!(out, "  Duplicate groups:      {}", stats.duplicate_groups)?;

        let verb = if outcome.dry_run {
            "Would delete:"
        } else {
            "Deleted:"
        };
        writeln!(
            out,
            "  {:<22} {} file(s), {}",
            verb,
            stats.files_deleted,
            ByteSize::b(stats.bytes_reclaimed)
        )?;
        let verb = if outcome.dry_run {
            "Would remove dirs:"
        } else {
            "Removed dirs:"
        };
        writeln!(out, "  {:<22} {}", verb, stats.dirs_removed)?;
        if stats.discarded_dirs > 0 {
            writeln!(out, "  Repeat directories:    {}", stats.discarded_dirs)?;
        }
        if stats.has_errors() {
            writeln!(
                out,
                "  {} {} unreadable file(s), {} failed deletion(s)",
                "Errors:".red().bold(),
                stats.file_errors,
                stats.deletion_failures
            )?;
        }
        out.flush()
    }
}

impl<W: Write> RunObserver for TextReporter<W> {
    fn on_group(&self, group: &DuplicateGroup) {
        if self.groups_seen.get() > 0 {
            self.emit(format_args!(""));
        }
        self.groups_seen.set(self.groups_seen.get() + 1);
        self.emit(format_args!(
            "{}",
            format!(
                "{} identical files, {} each",
                group.len(),
                ByteSize::b(group.size)
            )
            .bold()
        ));
    }

    fn on_file_decision(&self, decision: &FileDecision) {
        let path = decision.path().display();
        match decision {
            FileDecision::Retained { is_reference, .. } => {
                let suffix = if *is_reference { " (reference)" } else { "" };
                self.emit(format_args!(
                    "  {:<13} {}{}",
                    "keep".green(),
                    path,
                    suffix.dim()
                ));
            }
            FileDecision::Deleted { .. } => {
                self.emit(format_args!("  {:<13} {}", decision.label().yellow(), path));
            }
            FileDecision::Failed { error, .. } => {
                self.emit(format_args!(
                    "  {:<13} {}: {}",
                    "failed".red().bold(),
                    path,
                    error
                ));
            }
        }
    }

    fn on_dir_removed(&self, path: &Path, dry_run: bool) {
        if self.dirs_seen.get() == 0 {
            self.emit(format_args!(""));
        }
        self.dirs_seen.set(self.dirs_seen.get() + 1);
        let label = if dry_run { "would rmdir" } else { "rmdir" };
        self.emit(format_args!("  {:<13} {}", label.cyan(), path.display()));
    }
}
