//! `condify translate`: print the conda form of Python requirements.

use anyhow::{Context, Result};

use crate::cli::TranslateArgs;
use crate::commands::ExitStatus;
use crate::printer::Printer;
use crate::requirement::{NameTable, translate_requirements};

/// Execute `condify translate`.
pub(crate) fn execute(args: &TranslateArgs, printer: Printer) -> Result<ExitStatus> {
    let names = match &args.conda_name_differences {
        Some(pairs) => pairs
            .parse::<NameTable>()
            .context("Invalid --conda-name-differences")?,
        None => NameTable::new(),
    };

    let translated = translate_requirements(&args.requirements, &names)?;
    for line in &translated {
        printer.result(line);
    }
    Ok(ExitStatus::Success)
}
