//! `condify select`: keep the conda requirement lines whose `# [selector]`
//! holds for a given Python version and platform.

use anyhow::Result;
use tracing::debug;

use crate::cli::SelectArgs;
use crate::commands::ExitStatus;
use crate::evaluate::SelectorEvaluator;
use crate::printer::Printer;

/// Execute `condify select`.
pub(crate) fn execute(args: &SelectArgs, printer: Printer) -> Result<ExitStatus> {
    let evaluator = SelectorEvaluator::for_subdir(&args.python_version, &args.platform)?;
    let selected = evaluator.filter(&args.lines)?;
    debug!(
        "Selected {} of {} lines for {} on {}",
        selected.len(),
        args.lines.len(),
        args.python_version,
        args.platform
    );
    for line in &selected {
        printer.result(line);
    }
    Ok(ExitStatus::Success)
}
