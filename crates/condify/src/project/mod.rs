//! Python project discovery and configuration.
//!
//! A project is a directory with a `setup.py`, `setup.cfg` or
//! `pyproject.toml`. Settings are read from those files in a fixed priority
//! order (see [`config`]); anything they do not declare statically is taken
//! from the `egg_info` metadata produced by the project's own setup script.

pub mod config;
pub mod discovery;
pub mod metadata;
pub mod options;

pub use config::{Origin, ProjectConfig, Setting};
pub use discovery::Project;
pub use metadata::ProjectMetadata;
pub use options::{BuildOptions, DistSource, RawBuildOptions};

/// Split a list-valued setting on `delimiter` or newlines.
///
/// Items are trimmed and empty items dropped, so both `a, b` and a
/// multi-line `setup.cfg` value yield `["a", "b"]`.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(|c| c == delimiter || c == '\n')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Split a list of requirements on commas or newlines.
///
/// Unlike [`split_list`], a comma followed by a version operator continues
/// the current requirement, so `foo>=1.0,<2, bar` yields
/// `["foo>=1.0,<2", "bar"]`.
pub fn split_requirements(value: &str) -> Vec<String> {
    let mut requirements: Vec<String> = Vec::new();
    for line in value.lines() {
        let mut continues = false;
        for item in line.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match requirements.last_mut() {
                Some(previous) if continues && item.starts_with(['<', '>', '=', '!', '~']) => {
                    previous.push(',');
                    previous.push_str(item);
                }
                _ => requirements.push(item.to_owned()),
            }
            continues = true;
        }
    }
    requirements
}
