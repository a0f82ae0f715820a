//! Running external tools: `python`, `pip`, `conda` and `conda-build`.
//!
//! Every command is echoed as `[running]: <argv>` before it runs. Commands
//! that change the environment go through [`Runner::run`] and are skipped in
//! dry-run mode; queries go through [`Runner::query`] and always run.

use std::borrow::Cow;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::printer::Printer;

/// The outcome of a command run through [`Runner::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, or 1 if the process was terminated by a signal.
    pub exit_code: u8,
}

impl CommandResult {
    pub fn success(self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands on behalf of a condify command.
#[derive(Debug, Clone)]
pub struct Runner {
    printer: Printer,
    python: String,
    dry_run: bool,
}

impl Runner {
    pub fn new(printer: Printer, python: impl Into<String>, dry_run: bool) -> Self {
        Self {
            printer,
            python: python.into(),
            dry_run,
        }
    }

    /// The Python interpreter used for setup scripts and queries.
    pub fn python(&self) -> &str {
        &self.python
    }

    pub fn printer(&self) -> Printer {
        self.printer
    }

    /// Run `command` with inherited stdio, unless this is a dry run.
    pub fn run(&self, command: &mut Command) -> Result<CommandResult> {
        let shown = display_command(command);
        self.printer.running(&shown);
        if self.dry_run {
            return Ok(CommandResult { exit_code: 0 });
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run `{shown}`"))?;
        debug!("`{shown}` exited with {status}");

        let exit_code = status
            .code()
            .map_or(1, |code| u8::try_from(code).unwrap_or(1));
        Ok(CommandResult { exit_code })
    }

    /// Run `command` and return its standard output. Failure is an error.
    pub fn query(&self, command: &mut Command) -> Result<String> {
        let shown = display_command(command);
        self.printer.running(&shown);

        let output = command
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run `{shown}`"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{shown}` failed with {}:\n{}",
                output.status,
                stderr.trim_end()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `MAJOR.MINOR.PATCH` of the configured interpreter.
    pub fn python_full_version(&self) -> Result<String> {
        let mut command = Command::new(&self.python);
        command
            .arg("-c")
            .arg("import platform; print(platform.python_version())");
        let version = self.query(&mut command)?;
        Ok(version.trim().to_owned())
    }
}

/// Shell-quoted rendering of `command`'s argv.
pub fn display_command(command: &Command) -> String {
    let program = command.get_program().to_string_lossy();
    let args = command.get_args().map(|arg| arg.to_string_lossy());
    std::iter::once(program)
        .chain(args)
        .map(|arg| quote(&arg).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(arg: &str) -> Cow<'_, str> {
    shlex::try_quote(arg).unwrap_or(Cow::Borrowed(arg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments() {
        let mut command = Command::new("conda");
        command.args(["install", "-y", "numpy>=1.20", "pywin32 # [win]"]);
        let display = display_command(&command);
        assert!(display.starts_with("conda install -y "));
        assert_eq!(
            shlex::split(&display).unwrap(),
            ["conda", "install", "-y", "numpy>=1.20", "pywin32 # [win]"]
        );
    }

    #[test]
    fn dry_run_skips_commands() {
        let runner = Runner::new(Printer::new(0, true), "python", true);
        let mut command = Command::new("definitely-not-a-real-program");
        let result = runner.run(&mut command).unwrap();
        assert!(result.success());
    }

    #[test]
    fn missing_program_is_an_error() {
        let runner = Runner::new(Printer::new(0, true), "python", false);
        let mut command = Command::new("definitely-not-a-real-program");
        assert!(runner.query(&mut command).is_err());
        let err = runner.run(&mut command).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to run `definitely-not-a-real-program`"
        );
    }

    #[test]
    fn run_reports_success() {
        let runner = Runner::new(Printer::new(0, true), "python", false);
        let mut command = Command::new(std::env::current_exe().unwrap());
        command.arg("--list");
        let result = runner.run(&mut command).unwrap();
        assert!(result.success());
    }
}
