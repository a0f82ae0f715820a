//! `condify install-requirements`: install the build and run requirements of
//! one or more projects into the active conda environment.
//!
//! Requirements are evaluated against the host first, so the installed
//! lines carry no selectors. Run requirements on any of the projects being
//! processed are dropped, which lets those projects be installed in editable
//! mode afterwards.

use std::cell::OnceCell;
use std::env;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use pep508_rs::MarkerEnvironment;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::cli::{InstallRequirementsArgs, RequirementOverrides};
use crate::commands::{ExitStatus, Runner};
use crate::evaluate::{HostEnvironment, evaluate_requirements};
use crate::printer::Printer;
use crate::project::{Origin, Project, ProjectConfig, ProjectMetadata, Setting};
use crate::requirement::{NameTable, Requirement, translate_name, translate_requirements};

/// Execute `condify install-requirements`.
pub(crate) fn execute(args: &InstallRequirementsArgs, runner: &Runner) -> Result<ExitStatus> {
    let printer = runner.printer();
    let host = host_environment(runner, args.python_version.as_deref())?;
    let env = host.marker_environment()?;

    let projects = args
        .projects
        .iter()
        .map(|dir| ProjectContext::load(dir, &args.overrides, printer))
        .collect::<Result<Vec<_>>>()?;

    printer.info("Getting build requirements...");
    let mut build_requires = Vec::new();
    let mut channels = Vec::new();
    for project in &projects {
        let requires = project.build_requires(&args.overrides, printer);
        build_requires.extend(project.translate_for_host(&requires, &env)?);
        channels.extend(project.channels.iter().cloned());
    }
    let channels = unique(channels);

    let status = conda_install(runner, &unique(build_requires), &channels)?;
    if status != ExitStatus::Success {
        return Ok(status);
    }

    printer.info("Getting run requirements...");
    let mut run_requires = Vec::new();
    let mut own_names = FxHashSet::default();
    for project in &projects {
        let requires = project.run_requires(&args.overrides, runner)?;
        run_requires.extend(project.translate_for_host(&requires, &env)?);
        own_names.insert(translate_name(&project.name(runner)?, &project.names));
    }
    let run_requires = remove_projects(unique(run_requires), &own_names, printer);

    conda_install(runner, &run_requires, &channels)
}

/// A project together with the settings shared by every command.
pub(crate) struct ProjectContext {
    pub(crate) project: Project,
    pub(crate) config: ProjectConfig,
    pub(crate) names: NameTable,
    pub(crate) channels: Vec<String>,
    metadata: OnceCell<ProjectMetadata>,
}

impl ProjectContext {
    pub(crate) fn load(
        dir: &Path,
        overrides: &RequirementOverrides,
        printer: Printer,
    ) -> Result<Self> {
        let project = Project::discover(dir)?;
        let config = ProjectConfig::load(project.root())?;

        let names = config.name_differences(overrides.conda_name_differences.as_deref())?;
        if names.value.is_empty() {
            printer.debug("No name differences");
        } else {
            printer.info(&format!("Using name differences from {}", names.origin));
        }

        let channels = config.channels(overrides.channels.as_deref());
        if !channels.value.is_empty() {
            printer.info(&format!("Using extra channels from {}", channels.origin));
        }

        Ok(Self {
            project,
            config,
            names: names.value,
            channels: channels.value,
            metadata: OnceCell::new(),
        })
    }

    /// The `egg_info` metadata, gathered on first use.
    pub(crate) fn metadata(&self, runner: &Runner) -> Result<&ProjectMetadata> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata);
        }
        let metadata = ProjectMetadata::from_egg_info(runner, &self.project)?;
        Ok(self.metadata.get_or_init(|| metadata))
    }

    /// Raw build requirements.
    pub(crate) fn build_requires(
        &self,
        overrides: &RequirementOverrides,
        printer: Printer,
    ) -> Vec<String> {
        match self.config.build_requires(overrides.setup_requires.as_deref()) {
            Some(setting) => announce(setting, "build requirements", printer),
            None => {
                printer.info("No build requirements");
                Vec::new()
            }
        }
    }

    /// Raw run requirements, from the `egg_info` metadata if no
    /// configuration file declares them.
    pub(crate) fn run_requires(
        &self,
        overrides: &RequirementOverrides,
        runner: &Runner,
    ) -> Result<Vec<String>> {
        let setting = match self.config.run_requires(overrides.install_requires.as_deref()) {
            Some(setting) => setting,
            None => Setting::new(self.metadata(runner)?.requires.clone(), Origin::EggInfo),
        };
        if setting.value.is_empty() {
            runner.printer().info("No run requirements");
            return Ok(Vec::new());
        }
        Ok(announce(setting, "run requirements", runner.printer()))
    }

    /// The distribution name.
    pub(crate) fn name(&self, runner: &Runner) -> Result<String> {
        match self.config.name() {
            Some(name) => Ok(name),
            None => Ok(self.metadata(runner)?.name.clone()),
        }
    }

    /// Keep the requirements that apply on the host and translate them.
    pub(crate) fn translate_for_host(
        &self,
        requires: &[String],
        env: &MarkerEnvironment,
    ) -> Result<Vec<String>> {
        let applicable = evaluate_requirements(requires, env)?;
        translate_requirements(&applicable, &self.names).with_context(|| {
            format!(
                "Failed to translate the requirements of {}",
                self.project.root().display()
            )
        })
    }
}

fn announce(setting: Setting<Vec<String>>, what: &str, printer: Printer) -> Vec<String> {
    printer.info(&format!("Using {what} from {}", setting.origin));
    setting.value
}

/// Describe the host for marker evaluation, querying the interpreter unless
/// a Python version was given.
pub(crate) fn host_environment(
    runner: &Runner,
    python_version: Option<&str>,
) -> Result<HostEnvironment> {
    let version = match python_version {
        Some(version) => version.to_owned(),
        None => runner
            .python_full_version()
            .context("Failed to determine the Python version")?,
    };
    debug!("Evaluating markers for Python {version}");
    Ok(HostEnvironment::detect(&version))
}

/// `conda install -y [--channel C]... <requirements>`; nothing to install is
/// a success.
pub(crate) fn conda_install(
    runner: &Runner,
    requirements: &[String],
    channels: &[String],
) -> Result<ExitStatus> {
    if requirements.is_empty() {
        return Ok(ExitStatus::Success);
    }
    let mut command = Command::new(conda_executable());
    command.arg("install").arg("-y");
    for channel in channels {
        command.arg("--channel").arg(channel);
    }
    command.args(requirements);
    Ok(runner.run(&mut command)?.into())
}

/// The conda executable of the active installation.
fn conda_executable() -> OsString {
    env::var_os("CONDA_EXE")
        .filter(|exe| !exe.is_empty())
        .unwrap_or_else(|| OsString::from("conda"))
}

/// Drop repeated items, keeping the first occurrence.
pub(crate) fn unique(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Drop requirements on the projects whose requirements are being installed.
fn remove_projects(
    requirements: Vec<String>,
    projects: &FxHashSet<String>,
    printer: Printer,
) -> Vec<String> {
    requirements
        .into_iter()
        .filter(|requirement| {
            let own = projects.contains(Requirement::parse(requirement).name());
            if own {
                printer.info(&format!("Ignoring requirement {requirement}"));
            }
            !own
        })
        .collect()
}
