//! Human-facing output for condify commands.
//!
//! The [`Printer`] writes progress and diagnostics to stderr, honouring the
//! user's `--quiet` and `--verbose` flags. Errors are always printed. Command
//! results (translated requirement lines) go to stdout through
//! [`Printer::result`] so they can be piped.

use anstream::{eprintln, println};
use owo_colors::OwoColorize;

/// Controls output formatting for condify commands.
#[derive(Debug, Copy, Clone)]
pub struct Printer {
    /// Verbosity level: 0 = normal, 1+ = verbose.
    verbosity: u8,
    /// Whether output is suppressed.
    quiet: bool,
}

impl Printer {
    pub fn new(verbosity: u8, quiet: bool) -> Self {
        Self { verbosity, quiet }
    }

    /// Print an informational message to stderr.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Print a warning message to stderr.
    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}: {}", "warning".yellow().bold(), message);
        }
    }

    /// Print an error message to stderr, even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}: {}", "error".red().bold(), message);
    }

    /// Print a debug message (only at verbosity >= 1).
    pub fn debug(&self, message: &str) {
        if self.verbosity >= 1 && !self.quiet {
            eprintln!("{}: {}", "debug".dimmed(), message);
        }
    }

    /// Echo an external command before it runs.
    pub fn running(&self, command: &str) {
        if !self.quiet {
            eprintln!("{} {}", "[running]:".cyan().bold(), command);
        }
    }

    /// Print one line of command output to stdout. Never silenced.
    pub fn result(&self, line: &str) {
        println!("{line}");
    }
}
