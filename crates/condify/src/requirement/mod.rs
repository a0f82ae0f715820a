//! Translation of Python requirements into conda requirements.
//!
//! ## Architecture
//!
//! A raw line flows through [`Requirement::parse`], after which each part is
//! translated on its own:
//!
//! - name -> [`translate_name`] (override table, then normalization)
//! - version specifiers -> [`translate_version_specifiers`]
//! - environment marker -> [`translate_marker`], appended as `# [selector]`
//!
//! For example `foo>=2.0; sys_platform=='win32'` becomes `foo>=2.0 # [win]`.

mod error;
pub mod marker;
pub mod name;
pub mod parse;
pub mod version;

pub use error::TranslateError;
pub use marker::translate_marker;
pub use name::{NameTable, translate_name};
pub use parse::Requirement;
pub use version::translate_version_specifiers;

use tracing::trace;

/// Translate a single requirement line into a conda requirement line.
pub fn translate_requirement(line: &str, names: &NameTable) -> Result<String, TranslateError> {
    let requirement = Requirement::parse(line);

    let mut translated = translate_name(requirement.name(), names);
    if let Some(specifiers) = requirement.version_specifiers() {
        translated.push_str(&translate_version_specifiers(specifiers)?);
    }
    if let Some(marker) = requirement.marker() {
        translated.push_str(" # [");
        translated.push_str(&translate_marker(marker));
        translated.push(']');
    }

    trace!(requirement = line, conda = %translated, "Translated requirement");
    Ok(translated)
}

/// Translate every requirement line, stopping at the first failure.
///
/// No partial list is returned: either every line translates or the batch
/// fails.
pub fn translate_requirements<S: AsRef<str>>(
    lines: &[S],
    names: &NameTable,
) -> Result<Vec<String>, TranslateError> {
    lines
        .iter()
        .map(|line| translate_requirement(line.as_ref(), names))
        .collect()
}
