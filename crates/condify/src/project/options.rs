//! Build options: what the user asked for, and what a build will use.
//!
//! [`RawBuildOptions`] collects the command line and `setup.cfg` values as
//! given. [`BuildOptions::finalize`] validates them once against the
//! project directory; the result is never modified afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::project::split_list;

/// Stems recognised as a license file, compared case-insensitively.
const LICENSE_STEMS: [&str; 3] = ["LICENSE", "COPYING", "COPYRIGHT"];

/// Build options as given, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBuildOptions {
    /// Comma-separated Python versions to build for.
    pub pythons: Option<String>,
    pub build_number: u32,
    /// Path to the license file, or `None` to build without one.
    pub license_file: Option<String>,
    pub build_string: Option<String>,
    pub ignore_run_exports: Vec<String>,
    /// Comma-separated paths of link scripts to include in the recipe.
    pub link_scripts: Option<String>,
    pub noarch: bool,
    pub from_wheel: bool,
    pub from_downloaded_wheel: bool,
    pub compilers: bool,
}

/// What the conda package is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistSource {
    /// A `.tar.gz` made with `setup.py sdist`.
    Sdist,
    /// A wheel made with `setup.py bdist_wheel`.
    Wheel,
    /// A wheel of the same name and version downloaded from PyPI.
    DownloadedWheel,
}

impl DistSource {
    pub fn is_wheel(self) -> bool {
        matches!(self, Self::Wheel | Self::DownloadedWheel)
    }

    /// File extension of the distribution.
    pub fn extension(self) -> &'static str {
        if self.is_wheel() { ".whl" } else { ".tar.gz" }
    }
}

/// Validated build options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub pythons: Vec<String>,
    pub build_number: u32,
    pub license_file: Option<PathBuf>,
    pub build_string: Option<String>,
    pub ignore_run_exports: Vec<String>,
    /// Link script file name to contents.
    pub link_scripts: BTreeMap<String, String>,
    pub noarch: bool,
    pub dist_source: DistSource,
    pub compilers: bool,
}

impl BuildOptions {
    /// Validate `raw` against the project in `project_dir`.
    ///
    /// `current_python` supplies the `MAJOR.MINOR` version of the running
    /// interpreter and is only called when no Python versions were given.
    pub fn finalize(
        raw: RawBuildOptions,
        project_dir: &Path,
        current_python: impl FnOnce() -> Result<String>,
    ) -> Result<Self> {
        let license_file = match raw.license_file.as_deref().map(str::trim) {
            Some("None") => None,
            Some(path) => {
                let path = project_dir.join(path);
                if !path.is_file() {
                    bail!("License file {} doesn't exist", path.display());
                }
                Some(path)
            }
            None => Some(find_license_file(project_dir)?.with_context(|| {
                format!(
                    "No file called LICENSE, COPYING or COPYRIGHT with any extension found in {}; \
                     set license_file to `None` to build without a license file",
                    project_dir.display()
                )
            })?),
        };

        let dist_source = match (raw.from_wheel, raw.from_downloaded_wheel) {
            (false, false) => DistSource::Sdist,
            (true, false) => DistSource::Wheel,
            (false, true) => DistSource::DownloadedWheel,
            (true, true) => bail!("Can't specify `from-wheel` and `from-downloaded-wheel` simultaneously"),
        };

        let mut pythons = raw
            .pythons
            .as_deref()
            .map(|pythons| split_list(pythons, ','))
            .unwrap_or_default();
        if !pythons.is_empty() {
            if raw.noarch {
                bail!("Can't specify `pythons` and `noarch` simultaneously");
            }
            if dist_source.is_wheel() {
                bail!(
                    "Can't specify `pythons` if `from-wheel` or `from-downloaded-wheel` is set; \
                     the wheel is built for the current Python only"
                );
            }
        } else {
            pythons.push(current_python()?);
        }

        let mut link_scripts = BTreeMap::new();
        for script in raw
            .link_scripts
            .as_deref()
            .map(|scripts| split_list(scripts, ','))
            .unwrap_or_default()
        {
            let path = project_dir.join(&script);
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .with_context(|| format!("Invalid link script path `{script}`"))?
                .to_owned();
            let contents = fs_err::read_to_string(&path)?;
            link_scripts.insert(name, contents);
        }

        Ok(Self {
            pythons,
            build_number: raw.build_number,
            license_file,
            build_string: raw.build_string,
            ignore_run_exports: raw.ignore_run_exports,
            link_scripts,
            noarch: raw.noarch,
            dist_source,
            compilers: raw.compilers,
        })
    }
}

/// The first file in `dir` named like a license, in file name order.
fn find_license_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
        if LICENSE_STEMS
            .iter()
            .any(|license| stem.eq_ignore_ascii_case(license))
        {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}
