//! condify: build conda packages from Python projects.
//!
//! The core is the requirement translation engine in [`requirement`], which
//! turns PEP 508 requirements into conda requirement lines with
//! `# [selector]` comments, and the two evaluators in [`evaluate`]. The
//! [`project`], [`recipe`] and [`commands`] modules build the command line
//! tool on top of them.

#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::ffi::OsString;
use std::process::ExitCode;

use anstream::eprintln;
use clap::Parser;
use owo_colors::OwoColorize;

use crate::cli::Cli;
use crate::commands::ExitStatus;
use crate::printer::Printer;

pub mod cli;
pub mod commands;
pub mod evaluate;
pub mod logging;
pub mod printer;
pub mod project;
pub mod recipe;
pub mod requirement;

/// Entry point for the condify CLI.
///
/// Parses CLI arguments, initialises logging and dispatches to the
/// appropriate command handler.
pub fn main<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    logging::init(cli.verbose, cli.quiet);
    let printer = Printer::new(cli.verbose, cli.quiet);

    match commands::dispatch(cli, printer) {
        Ok(code) => code.into(),
        Err(err) => {
            let mut causes = err.chain();
            if let Some(error) = causes.next() {
                printer.error(&error.to_string());
            }
            for cause in causes {
                eprintln!(
                    "  {}: {}",
                    "Caused by".red().bold(),
                    cause.to_string().trim()
                );
            }
            ExitStatus::Error.into()
        }
    }
}
