//! CLI argument definitions for condify.
//!
//! All clap derive structs live here. The [`Cli`] struct is the top-level
//! parser; [`Commands`] enumerates every subcommand.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};

/// Clap v3-style help menu colors.
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Build conda packages from Python projects.
#[derive(Parser, Debug)]
#[command(
    name = "condify",
    author,
    version,
    about = "Build conda packages from Python projects.",
    styles = STYLES,
    after_help = "Use `condify help <command>` for more information on a specific command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity.
    #[arg(global = true, short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results.
    #[arg(global = true, short, long)]
    pub quiet: bool,

    /// The Python interpreter used to run setup scripts.
    #[arg(
        global = true,
        long,
        env = "CONDIFY_PYTHON",
        default_value = "python",
        value_name = "EXE"
    )]
    pub python: String,
}

/// Top-level subcommands for condify.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a conda package from a Python project.
    Build(BuildArgs),

    /// Install the build and run requirements of projects with conda.
    InstallRequirements(InstallRequirementsArgs),

    /// Translate Python requirements into conda requirements.
    Translate(TranslateArgs),

    /// Keep the conda requirement lines whose selector holds on a platform.
    Select(SelectArgs),
}

impl Commands {
    /// Return the subcommand name as a static string (for diagnostics).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Build(_) => "build",
            Self::InstallRequirements(_) => "install-requirements",
            Self::Translate(_) => "translate",
            Self::Select(_) => "select",
        }
    }
}

/// Requirement settings that override the project's configuration files.
#[derive(Args, Debug, Default)]
pub struct RequirementOverrides {
    /// Build requirements, comma-separated. Default: `[condify]
    /// setup_requires` in setup.cfg, `[build-system] requires` in
    /// pyproject.toml, or `[options] setup_requires` in setup.cfg.
    #[arg(long, value_name = "REQUIREMENTS")]
    pub setup_requires: Option<String>,

    /// Run requirements, comma-separated. Default: `[condify]
    /// install_requires` in setup.cfg, `[project] dependencies` in
    /// pyproject.toml, or the project metadata.
    #[arg(long, value_name = "REQUIREMENTS")]
    pub install_requires: Option<String>,

    /// Packages whose conda name differs from their PyPI name, as
    /// comma-separated `pypi-name:conda-name` pairs.
    #[arg(long, value_name = "PAIRS")]
    pub conda_name_differences: Option<String>,

    /// Additional channels to search, comma-separated.
    #[arg(short, long, value_name = "CHANNELS")]
    pub channels: Option<String>,
}

/// Arguments for `condify build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// The project directory.
    #[arg(default_value = ".")]
    pub project: PathBuf,

    #[command(flatten)]
    pub overrides: RequirementOverrides,

    /// Python versions to build for, comma-separated. Default: the version
    /// of the interpreter running the build.
    #[arg(long, value_name = "VERSIONS")]
    pub pythons: Option<String>,

    /// Conda build number.
    #[arg(short = 'n', long, value_name = "NUMBER")]
    pub build_number: Option<u32>,

    /// License file to include in the package, or `None` for no license
    /// file. Default: the file named LICENSE, COPYING or COPYRIGHT.
    #[arg(short, long, value_name = "PATH")]
    pub license_file: Option<String>,

    /// Conda build string.
    #[arg(short = 's', long, value_name = "STRING")]
    pub build_string: Option<String>,

    /// Run exports of build dependencies to ignore, comma-separated.
    #[arg(long, value_name = "PACKAGES")]
    pub ignore_run_exports: Option<String>,

    /// Link scripts to include in the recipe, comma-separated paths.
    #[arg(long, value_name = "PATHS")]
    pub link_scripts: Option<String>,

    /// Build a noarch package.
    #[arg(long)]
    pub noarch: bool,

    /// Build from a wheel made with `setup.py bdist_wheel`.
    #[arg(long, conflicts_with = "from_downloaded_wheel")]
    pub from_wheel: bool,

    /// Build from the wheel of this name and version on PyPI.
    #[arg(long)]
    pub from_downloaded_wheel: bool,

    /// Add the C and C++ compilers to the build requirements.
    #[arg(long)]
    pub compilers: bool,

    /// Do not install the build requirements first.
    #[arg(long)]
    pub skip_build_requires: bool,
}

/// Arguments for `condify install-requirements`.
#[derive(Args, Debug)]
pub struct InstallRequirementsArgs {
    /// Project directories.
    #[arg(required = true)]
    pub projects: Vec<PathBuf>,

    #[command(flatten)]
    pub overrides: RequirementOverrides,

    /// Evaluate markers for this Python version instead of querying the
    /// interpreter.
    #[arg(long, value_name = "VERSION")]
    pub python_version: Option<String>,

    /// Print the conda commands instead of running them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `condify translate`.
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Python requirements, such as `foo>=2.0; sys_platform == 'win32'`.
    #[arg(required = true)]
    pub requirements: Vec<String>,

    /// Packages whose conda name differs from their PyPI name, as
    /// comma-separated `pypi-name:conda-name` pairs.
    #[arg(long, value_name = "PAIRS")]
    pub conda_name_differences: Option<String>,
}

/// Arguments for `condify select`.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Conda requirement lines, such as `foo>=2.0 # [win]`.
    #[arg(required = true)]
    pub lines: Vec<String>,

    /// Python version (`MAJOR.MINOR`) to evaluate selectors for.
    #[arg(long, value_name = "VERSION")]
    pub python_version: String,

    /// Conda platform subdir, such as `linux-64` or `win-64`.
    #[arg(long, value_name = "SUBDIR")]
    pub platform: String,
}
