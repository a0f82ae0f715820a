//! Project metadata gathered by running `setup.py egg_info`.
//!
//! The setup script is the only reliable source for dynamic projects, so it
//! is run into a temporary `--egg-base` and the resulting `.egg-info`
//! directory is parsed:
//!
//! - `PKG-INFO`: name, version, home page, license and summary
//! - `requires.txt`: run requirements
//! - `entry_points.txt`: console and GUI scripts

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use configparser::ini::Ini;
use mailparse::MailHeaderMap;
use tracing::debug;

use crate::commands::Runner;
use crate::project::Project;

/// Entry point groups that become conda `entry_points`.
const SCRIPT_GROUPS: [&str; 2] = ["console_scripts", "gui_scripts"];

/// Metadata of a built distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: String,
    pub home: Option<String>,
    pub license: Option<String>,
    pub summary: Option<String>,
    /// Run requirements, each with its environment marker if it has one.
    pub requires: Vec<String>,
    /// `name = module:function` script declarations.
    pub entry_points: Vec<String>,
}

impl ProjectMetadata {
    /// Run `setup.py egg_info` for `project` and parse its output.
    pub fn from_egg_info(runner: &Runner, project: &Project) -> Result<Self> {
        let egg_base = tempfile::Builder::new()
            .prefix("egg-info-tempdir-")
            .tempdir()?;

        let mut command = project.setup_command(runner.python());
        command.arg("egg_info").arg("--egg-base").arg(egg_base.path());
        runner
            .query(&mut command)
            .with_context(|| format!("Failed to get metadata of {}", project.root().display()))?;

        let egg_info = find_egg_info(egg_base.path())?;
        Self::from_egg_info_dir(&egg_info)
    }

    /// Parse an existing `.egg-info` directory.
    pub fn from_egg_info_dir(dir: &Path) -> Result<Self> {
        let pkg_info = fs_err::read(dir.join("PKG-INFO"))?;
        let (headers, _) = mailparse::parse_headers(&pkg_info)
            .map_err(|err| anyhow!(err))
            .context("Failed to parse PKG-INFO")?;

        let field = |name: &str| {
            headers
                .get_first_value(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty() && value != "UNKNOWN")
        };

        let name = field("Name").context("PKG-INFO has no Name")?;
        let version = field("Version").context("PKG-INFO has no Version")?;
        let home = field("Home-page").or_else(|| {
            headers
                .get_first_value("Project-URL")
                .and_then(|url| url.split_once(',').map(|(_, url)| url.trim().to_owned()))
        });
        let license = field("License").or_else(|| field("License-Expression"));

        let requires = match read_optional(&dir.join("requires.txt"))? {
            Some(content) => parse_requires(&content),
            None => Vec::new(),
        };
        let entry_points = match read_optional(&dir.join("entry_points.txt"))? {
            Some(content) => parse_entry_points(&content)?,
            None => Vec::new(),
        };

        debug!(
            "Read metadata of {name} {version}: {} requirements, {} entry points",
            requires.len(),
            entry_points.len()
        );

        Ok(Self {
            name,
            version,
            home,
            license,
            summary: field("Summary"),
            requires,
            entry_points,
        })
    }
}

fn find_egg_info(egg_base: &Path) -> Result<PathBuf> {
    let mut found = Vec::new();
    for entry in fs_err::read_dir(egg_base)? {
        let path = entry?.path();
        if path.is_dir() && path.extension().is_some_and(|ext| ext == "egg-info") {
            found.push(path);
        }
    }
    match found.len() {
        0 => bail!("No .egg-info directory after running setup.py egg_info"),
        1 => Ok(found.remove(0)),
        _ => bail!("Multiple .egg-info directories after running setup.py egg_info"),
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        Ok(Some(fs_err::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Parse `requires.txt`.
///
/// Unconditional requirements come first. Sections named `[:marker]` hold
/// requirements that apply under `marker`; sections naming an extra are
/// skipped.
fn parse_requires(content: &str) -> Vec<String> {
    let mut requires = Vec::new();
    // `None` inside a skipped extras section.
    let mut marker: Option<Option<&str>> = Some(None);
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            marker = section.strip_prefix(':').map(Some);
            continue;
        }
        match marker {
            Some(Some(marker)) => requires.push(format!("{line}; {marker}")),
            Some(None) => requires.push(line.to_owned()),
            None => {}
        }
    }
    requires
}

/// Parse `entry_points.txt` into `name = target` script declarations.
fn parse_entry_points(content: &str) -> Result<Vec<String>> {
    let mut ini = Ini::new_cs();
    let sections = ini
        .read(content.to_owned())
        .map_err(|err| anyhow!(err))
        .context("Failed to parse entry_points.txt")?;

    let mut entry_points = Vec::new();
    for group in SCRIPT_GROUPS {
        let Some(scripts) = sections.get(group) else {
            continue;
        };
        let mut scripts: Vec<_> = scripts
            .iter()
            .filter_map(|(name, target)| Some(format!("{name} = {}", target.as_deref()?)))
            .collect();
        scripts.sort();
        entry_points.extend(scripts);
    }
    Ok(entry_points)
}
