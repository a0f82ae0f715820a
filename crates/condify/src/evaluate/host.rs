//! Install-time filtering of raw requirements against the running host.
//!
//! Marker semantics are not reimplemented here: markers are parsed and
//! evaluated by `pep508_rs`. This module only builds the marker environment
//! for the host and applies the splitting and filtering policy.

use std::str::FromStr;

use pep508_rs::{MarkerEnvironment, MarkerEnvironmentBuilder, MarkerTree};
use thiserror::Error;
use tracing::debug;

/// A marker that `pep508_rs` could not parse, or a host description it rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    #[error("invalid environment marker `{marker}`: {message}")]
    Invalid { marker: String, message: String },

    #[error("invalid Python version `{version}` for marker evaluation: {message}")]
    PythonVersion { version: String, message: String },
}

/// The interpreter and platform that markers are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    python_full_version: String,
    sys_platform: &'static str,
    os_name: &'static str,
    platform_system: &'static str,
    platform_machine: &'static str,
}

impl HostEnvironment {
    /// Describe this machine running the given Python (`3.11` or `3.11.4`).
    pub fn detect(python_version: &str) -> Self {
        let (sys_platform, os_name, platform_system) = match std::env::consts::OS {
            "windows" => ("win32", "nt", "Windows"),
            "macos" => ("darwin", "posix", "Darwin"),
            "linux" => ("linux", "posix", "Linux"),
            other => (other, "posix", other),
        };
        let platform_machine = match (std::env::consts::OS, std::env::consts::ARCH) {
            ("windows", "x86_64") => "AMD64",
            ("windows", "aarch64") => "ARM64",
            ("macos", "aarch64") => "arm64",
            ("linux", "x86") => "i686",
            (_, arch) => arch,
        };
        Self {
            python_full_version: python_version.trim().to_owned(),
            sys_platform,
            os_name,
            platform_system,
            platform_machine,
        }
    }

    /// The `MAJOR.MINOR` form used by the `python_version` marker.
    pub fn python_version(&self) -> String {
        self.python_full_version
            .split('.')
            .take(2)
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn sys_platform(&self) -> &str {
        self.sys_platform
    }

    /// Build the `pep508_rs` marker environment.
    pub fn marker_environment(&self) -> Result<MarkerEnvironment, MarkerError> {
        let python_version = self.python_version();
        MarkerEnvironment::try_from(MarkerEnvironmentBuilder {
            implementation_name: "cpython",
            implementation_version: &self.python_full_version,
            os_name: self.os_name,
            platform_machine: self.platform_machine,
            platform_python_implementation: "CPython",
            platform_release: "",
            platform_system: self.platform_system,
            platform_version: "",
            python_full_version: &self.python_full_version,
            python_version: &python_version,
            sys_platform: self.sys_platform,
        })
        .map_err(|err| MarkerError::PythonVersion {
            version: self.python_full_version.clone(),
            message: err.to_string(),
        })
    }
}

/// Keep the requirements that apply in `env`, with their markers removed.
///
/// Each entry is split once on `;`. Entries without a marker always apply,
/// blank entries are skipped, and a marker that cannot be parsed fails the
/// whole call.
pub fn evaluate_requirements<S: AsRef<str>>(
    entries: &[S],
    env: &MarkerEnvironment,
) -> Result<Vec<String>, MarkerError> {
    let mut requirements = Vec::new();
    for entry in entries {
        let entry = entry.as_ref().trim();
        if entry.is_empty() {
            continue;
        }

        let Some((requirement, marker)) = entry.split_once(';') else {
            requirements.push(entry.to_owned());
            continue;
        };
        let (requirement, marker) = (requirement.trim(), marker.trim());

        if marker.is_empty() || marker_applies(marker, env)? {
            requirements.push(requirement.to_owned());
        } else {
            debug!("Skipping `{requirement}`: `{marker}` does not hold");
        }
    }
    Ok(requirements)
}

fn marker_applies(marker: &str, env: &MarkerEnvironment) -> Result<bool, MarkerError> {
    let tree = MarkerTree::from_str(marker).map_err(|err| MarkerError::Invalid {
        marker: marker.to_owned(),
        message: err.to_string(),
    })?;
    Ok(tree.evaluate(env, &[]))
}
