//! Settings declared by the project's `setup.cfg` and `pyproject.toml`.
//!
//! Each list-valued setting is resolved from the first source that declares
//! it, highest priority first:
//!
//! 1. the command line;
//! 2. the `[condify]` section of `setup.cfg`;
//! 3. `pyproject.toml` (`[build-system] requires` and `[tool.condify]`);
//! 4. `[options] setup_requires` of `setup.cfg` (build requirements only).
//!
//! Run requirements additionally fall back to `[project] dependencies`, and
//! then to the `egg_info` metadata, which is not read here.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use configparser::ini::Ini;
use serde::Deserialize;

use crate::project::{split_list, split_requirements};
use crate::requirement::NameTable;

const SETUP_CFG: &str = "setup.cfg";
const PYPROJECT_TOML: &str = "pyproject.toml";

/// The condify section of `setup.cfg`.
const SECTION: &str = "condify";

/// Where a resolved setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    CommandLine,
    SetupCfg {
        section: &'static str,
        key: &'static str,
    },
    PyProject {
        table: &'static str,
        key: &'static str,
    },
    EggInfo,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandLine => f.write_str("the command line"),
            Self::SetupCfg { section, key } => write!(f, "[{section}] {key} in {SETUP_CFG}"),
            Self::PyProject { table, key } => write!(f, "[{table}] {key} in {PYPROJECT_TOML}"),
            Self::EggInfo => f.write_str("the egg_info metadata"),
        }
    }
}

/// A resolved setting and the source that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Setting<T> {
    pub fn new(value: T, origin: Origin) -> Self {
        Self { value, origin }
    }
}

/// The subset of `pyproject.toml` condify reads.
#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(rename = "build-system")]
    build_system: Option<BuildSystem>,
    project: Option<ProjectTable>,
    tool: Option<Tool>,
}

#[derive(Debug, Deserialize)]
struct BuildSystem {
    requires: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ProjectTable {
    name: Option<String>,
    dependencies: Option<Vec<String>>,
    #[serde(default)]
    dynamic: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Tool {
    condify: Option<CondifyTool>,
}

/// `[tool.condify]`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CondifyTool {
    channels: Option<Vec<String>>,
    conda_name_differences: Option<BTreeMap<String, String>>,
    ignore_run_exports: Option<Vec<String>>,
}

/// Statically declared configuration of one project directory.
#[derive(Debug, Default)]
pub struct ProjectConfig {
    setup_cfg: Option<Ini>,
    pyproject: PyProject,
}

impl ProjectConfig {
    /// Read `setup.cfg` and `pyproject.toml` from `project_dir`. Either file
    /// may be absent.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let setup_cfg = read_setup_cfg(&project_dir.join(SETUP_CFG))?;
        let pyproject = read_pyproject(&project_dir.join(PYPROJECT_TOML))?;
        Ok(Self {
            setup_cfg,
            pyproject,
        })
    }

    /// Build requirements, in raw Python form (markers included).
    pub fn build_requires(&self, cli: Option<&str>) -> Option<Setting<Vec<String>>> {
        if let Some(value) = cli {
            return Some(Setting::new(split_requirements(value), Origin::CommandLine));
        }
        if let Some(value) = self.requirement_list(SECTION, "setup_requires") {
            return Some(value);
        }
        if let Some(requires) = self
            .pyproject
            .build_system
            .as_ref()
            .and_then(|build| build.requires.clone())
        {
            return Some(Setting::new(
                requires,
                Origin::PyProject {
                    table: "build-system",
                    key: "requires",
                },
            ));
        }
        self.requirement_list("options", "setup_requires")
    }

    /// Run requirements declared without running the setup script.
    ///
    /// Returns `None` when the requirements must be read from the `egg_info`
    /// metadata instead.
    pub fn run_requires(&self, cli: Option<&str>) -> Option<Setting<Vec<String>>> {
        if let Some(value) = cli {
            return Some(Setting::new(split_requirements(value), Origin::CommandLine));
        }
        if let Some(value) = self.requirement_list(SECTION, "install_requires") {
            return Some(value);
        }
        let project = self.pyproject.project.as_ref()?;
        if project.dynamic.iter().any(|field| field == "dependencies") {
            return None;
        }
        project.dependencies.clone().map(|dependencies| {
            Setting::new(
                dependencies,
                Origin::PyProject {
                    table: "project",
                    key: "dependencies",
                },
            )
        })
    }

    /// Extra conda channels to search.
    pub fn channels(&self, cli: Option<&str>) -> Setting<Vec<String>> {
        if let Some(value) = cli {
            return Setting::new(split_list(value, ','), Origin::CommandLine);
        }
        if let Some(value) = self.condify_list("channels") {
            return value;
        }
        let origin = Origin::PyProject {
            table: "tool.condify",
            key: "channels",
        };
        Setting::new(
            self.tool().and_then(|tool| tool.channels.clone()).unwrap_or_default(),
            origin,
        )
    }

    /// Packages whose conda name differs from their PyPI name.
    pub fn name_differences(&self, cli: Option<&str>) -> Result<Setting<NameTable>> {
        if let Some(value) = cli {
            let table = value
                .parse::<NameTable>()
                .context("Invalid --conda-name-differences")?;
            return Ok(Setting::new(table, Origin::CommandLine));
        }
        if let Some(value) = self.setup_cfg_value(SECTION, "conda_name_differences") {
            let table = value
                .parse::<NameTable>()
                .with_context(|| format!("Invalid conda_name_differences in {SETUP_CFG}"))?;
            return Ok(Setting::new(
                table,
                Origin::SetupCfg {
                    section: SECTION,
                    key: "conda_name_differences",
                },
            ));
        }
        let origin = Origin::PyProject {
            table: "tool.condify",
            key: "conda-name-differences",
        };
        let table = self
            .tool()
            .and_then(|tool| tool.conda_name_differences.clone())
            .map(NameTable::from_iter)
            .unwrap_or_default();
        Ok(Setting::new(table, origin))
    }

    /// Run exports of build dependencies to ignore.
    pub fn ignore_run_exports(&self, cli: Option<&str>) -> Vec<String> {
        if let Some(value) = cli {
            return split_list(value, ',');
        }
        if let Some(setting) = self.condify_list("ignore_run_exports") {
            return setting.value;
        }
        self.tool()
            .and_then(|tool| tool.ignore_run_exports.clone())
            .unwrap_or_default()
    }

    /// A `setup.cfg` `[condify]` option that has no `pyproject.toml` form,
    /// such as `pythons` or `license_file`.
    pub fn option(&self, key: &str) -> Option<String> {
        self.setup_cfg_value(SECTION, key)
    }

    /// A boolean `setup.cfg` `[condify]` option; absent means `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.option(key).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    /// The distribution name, if declared statically.
    pub fn name(&self) -> Option<String> {
        self.pyproject
            .project
            .as_ref()
            .and_then(|project| project.name.clone())
            .or_else(|| self.setup_cfg_value("metadata", "name"))
    }

    fn tool(&self) -> Option<&CondifyTool> {
        self.pyproject.tool.as_ref()?.condify.as_ref()
    }

    fn condify_list(&self, key: &'static str) -> Option<Setting<Vec<String>>> {
        self.setup_cfg_list(SECTION, key)
    }

    fn setup_cfg_list(
        &self,
        section: &'static str,
        key: &'static str,
    ) -> Option<Setting<Vec<String>>> {
        self.setup_cfg_value(section, key)
            .map(|value| Setting::new(split_list(&value, ','), Origin::SetupCfg { section, key }))
    }

    fn requirement_list(
        &self,
        section: &'static str,
        key: &'static str,
    ) -> Option<Setting<Vec<String>>> {
        self.setup_cfg_value(section, key)
            .map(|value| Setting::new(split_requirements(&value), Origin::SetupCfg { section, key }))
    }

    fn setup_cfg_value(&self, section: &str, key: &str) -> Option<String> {
        self.setup_cfg.as_ref()?.get(section, key)
    }
}

fn read_setup_cfg(path: &Path) -> Result<Option<Ini>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs_err::read_to_string(path)?;
    let mut ini = Ini::new();
    ini.set_multiline(true);
    // Requirement markers contain `;`, so only `#` starts a comment.
    ini.set_comment_symbols(&['#']);
    ini.read(content)
        .map_err(|err| anyhow!(err))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(ini))
}

fn read_pyproject(path: &Path) -> Result<PyProject> {
    if !path.is_file() {
        return Ok(PyProject::default());
    }
    let content = fs_err::read_to_string(path)?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
