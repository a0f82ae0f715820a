//! Command dispatch for condify.

use std::env;
use std::process::ExitCode;

use anyhow::{Result, bail};

use crate::cli::{Cli, Commands};
use crate::printer::Printer;

pub use runner::{CommandResult, Runner};

mod build;
mod install_requirements;
mod runner;
mod select;
mod translate;

/// Exit status for condify commands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    /// The command succeeded.
    Success,

    /// The command failed due to an error in the user input.
    Failure,

    /// The command failed with an unexpected error.
    Error,

    /// The command's exit status is propagated from an external command.
    External(u8),
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => Self::from(0),
            ExitStatus::Failure => Self::from(1),
            ExitStatus::Error => Self::from(2),
            ExitStatus::External(code) => Self::from(code),
        }
    }
}

impl From<CommandResult> for ExitStatus {
    fn from(result: CommandResult) -> Self {
        if result.success() {
            Self::Success
        } else {
            Self::External(result.exit_code)
        }
    }
}

/// Dispatch a parsed CLI command to its handler.
pub fn dispatch(cli: Cli, printer: Printer) -> Result<ExitStatus> {
    match cli.command {
        Commands::Build(args) => {
            check_conda_environment()?;
            build::execute(&args, &Runner::new(printer, cli.python, false))
        }
        Commands::InstallRequirements(args) => {
            check_conda_environment()?;
            let runner = Runner::new(printer, cli.python, args.dry_run);
            install_requirements::execute(&args, &runner)
        }
        Commands::Translate(args) => translate::execute(&args, printer),
        Commands::Select(args) => select::execute(&args, printer),
    }
}

/// Commands that install or build packages must run inside an activated
/// conda environment.
fn check_conda_environment() -> Result<()> {
    match env::var_os("CONDA_PREFIX") {
        Some(prefix) if !prefix.is_empty() => Ok(()),
        _ => bail!("Cannot use condify outside of a conda environment (CONDA_PREFIX is not set)"),
    }
}
