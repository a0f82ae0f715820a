//! `condify build`: build a conda package from a Python project.
//!
//! The project is packaged as an sdist or wheel into `conda_build/`, a
//! recipe is written to `conda_build/recipe/`, and `conda-build` builds it
//! into `conda_build/conda-bld/`. The resulting packages are copied to
//! `conda_packages/<subdir>/`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::IgnoredAny;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cli::BuildArgs;
use crate::commands::install_requirements::{ProjectContext, conda_install, host_environment};
use crate::commands::{ExitStatus, Runner};
use crate::evaluate::Platform;
use crate::project::{BuildOptions, DistSource, ProjectConfig, ProjectMetadata, RawBuildOptions};
use crate::recipe::{Recipe, build_config_yaml};
use crate::requirement::{translate_name, translate_requirements};

/// Execute `condify build`.
pub(crate) fn execute(args: &BuildArgs, runner: &Runner) -> Result<ExitStatus> {
    let printer = runner.printer();
    let context = ProjectContext::load(&args.project, &args.overrides, printer)?;
    let root = context.project.root();

    let build_requires = context.build_requires(&args.overrides, printer);
    if !args.skip_build_requires {
        printer.info("Installing build requirements...");
        let env = host_environment(runner, None)?.marker_environment()?;
        let requires = context.translate_for_host(&build_requires, &env)?;
        let status = conda_install(runner, &requires, &context.channels)?;
        if status != ExitStatus::Success {
            return Ok(status);
        }
    }

    printer.info("Building...");
    let metadata = context.metadata(runner)?;
    let run_requires = context.run_requires(&args.overrides, runner)?;
    let options = BuildOptions::finalize(raw_options(args, &context.config)?, root, || {
        let version = runner.python_full_version()?;
        Ok(major_minor(&version))
    })?;

    // Markers become selectors: the recipe is evaluated by conda-build on
    // the target platform.
    let host_requires = translate_requirements(&build_requires, &context.names)
        .context("Failed to translate build requirements")?;
    let run_requires = translate_requirements(&run_requires, &context.names)
        .context("Failed to translate run requirements")?;

    let layout = Layout::new(root);
    layout.clean()?;
    fs_err::create_dir_all(&layout.recipe_dir)?;

    let mut command = dist_command(runner, &context, metadata, options.dist_source, &layout);
    let result = runner.run(&mut command)?;
    if !result.success() {
        return Ok(result.into());
    }
    let dist = find_distribution(&layout.build_dir, options.dist_source)?;
    let sha256 = sha256_file(&layout.build_dir.join(&dist))?;
    debug!("{dist} has SHA-256 {sha256}");

    fs_err::write(
        layout.recipe_dir.join("conda_build_config.yaml"),
        build_config_yaml(&options.pythons),
    )?;

    let license_file = match &options.license_file {
        Some(path) => {
            let name = file_name(path)?;
            fs_err::copy(path, layout.build_dir.join(&name))?;
            Some(name)
        }
        None => None,
    };

    let recipe = Recipe {
        name: translate_name(&metadata.name, &context.names),
        version: metadata.version.clone(),
        pip_target: if options.dist_source.is_wheel() {
            dist.clone()
        } else {
            ".".to_owned()
        },
        source: dist,
        sha256,
        build_number: options.build_number,
        noarch: options.noarch,
        build_string: options.build_string.clone(),
        ignore_run_exports: options.ignore_run_exports.clone(),
        entry_points: metadata.entry_points.clone(),
        compilers: options.compilers && !options.dist_source.is_wheel(),
        host_requires,
        run_requires,
        home: metadata.home.clone(),
        summary: metadata.summary.clone(),
        license: metadata.license.clone(),
        license_file,
    };
    fs_err::write(layout.recipe_dir.join("meta.yaml"), recipe.to_meta_yaml())?;

    for (name, contents) in &options.link_scripts {
        fs_err::write(layout.recipe_dir.join(name), contents)?;
    }

    let mut command = Command::new("conda-build");
    command.arg("--no-test").arg(&layout.recipe_dir);
    for channel in &context.channels {
        command.arg("-c").arg(channel);
    }
    command.env("CONDA_BLD_PATH", &layout.conda_bld_path);
    let result = runner.run(&mut command)?;
    if !result.success() {
        return Ok(result.into());
    }

    let subdir = if options.noarch {
        "noarch"
    } else {
        Platform::current()
            .context("conda does not support this platform")?
            .subdir()
    };
    let repo_dir = layout.conda_bld_path.join(subdir);
    let packages = read_repodata(&repo_dir.join("repodata.json"))?;

    let dist_dir = root.join("conda_packages").join(subdir);
    fs_err::create_dir_all(&dist_dir)?;
    for package in &packages {
        printer.info(&format!("Copying {package} to {}", dist_dir.display()));
        fs_err::copy(repo_dir.join(package), dist_dir.join(package))?;
    }

    Ok(ExitStatus::Success)
}

/// Combine the command line with the `[condify]` section of `setup.cfg`.
fn raw_options(args: &BuildArgs, config: &ProjectConfig) -> Result<RawBuildOptions> {
    let build_number = match args.build_number {
        Some(number) => number,
        None => config
            .option("build_number")
            .map(|number| number.trim().parse::<u32>())
            .transpose()
            .context("Invalid build_number in setup.cfg")?
            .unwrap_or(0),
    };
    Ok(RawBuildOptions {
        pythons: args.pythons.clone().or_else(|| config.option("pythons")),
        build_number,
        license_file: args
            .license_file
            .clone()
            .or_else(|| config.option("license_file")),
        build_string: args
            .build_string
            .clone()
            .or_else(|| config.option("build_string")),
        ignore_run_exports: config.ignore_run_exports(args.ignore_run_exports.as_deref()),
        link_scripts: args
            .link_scripts
            .clone()
            .or_else(|| config.option("link_scripts")),
        noarch: args.noarch || config.flag("noarch"),
        from_wheel: args.from_wheel || config.flag("from_wheel"),
        from_downloaded_wheel: args.from_downloaded_wheel || config.flag("from_downloaded_wheel"),
        compilers: args.compilers || config.flag("compilers"),
    })
}

/// Directories a build writes to, all under the project root.
#[derive(Debug)]
struct Layout {
    root: PathBuf,
    /// `conda_build/`: the distribution and license file.
    build_dir: PathBuf,
    /// `conda_build/recipe/`.
    recipe_dir: PathBuf,
    /// `conda_build/conda-bld/`: conda-build's output.
    conda_bld_path: PathBuf,
}

impl Layout {
    fn new(root: &Path) -> Self {
        let build_dir = root.join("conda_build");
        Self {
            root: root.to_path_buf(),
            recipe_dir: build_dir.join("recipe"),
            conda_bld_path: build_dir.join("conda-bld"),
            build_dir,
        }
    }

    /// Remove the output of previous builds, including setuptools' `build/`.
    fn clean(&self) -> Result<()> {
        for dir in [&self.build_dir, &self.root.join("build")] {
            if dir.is_dir() {
                debug!("Removing {}", dir.display());
                fs_err::remove_dir_all(dir)?;
            }
        }
        Ok(())
    }
}

/// The command producing the distribution the package is built from.
fn dist_command(
    runner: &Runner,
    context: &ProjectContext,
    metadata: &ProjectMetadata,
    source: DistSource,
    layout: &Layout,
) -> Command {
    match source {
        DistSource::DownloadedWheel => {
            let mut command = Command::new(runner.python());
            command
                .args(["-m", "pip", "download", "--only-binary=:all:", "--no-deps"])
                .arg("--dest")
                .arg(&layout.build_dir)
                .arg(format!("{}=={}", metadata.name, metadata.version))
                .current_dir(context.project.root());
            command
        }
        DistSource::Wheel | DistSource::Sdist => {
            let mut command = context.project.setup_command(runner.python());
            if source == DistSource::Wheel {
                command.arg("bdist_wheel");
            } else {
                command.args(["sdist", "--formats=gztar"]);
            }
            let mut dist_dir = std::ffi::OsString::from("--dist-dir=");
            dist_dir.push(&layout.build_dir);
            command.arg(dist_dir);
            command
        }
    }
}

/// The single distribution file in `dir` with the extension of `source`.
fn find_distribution(dir: &Path, source: DistSource) -> Result<String> {
    let extension = source.extension();
    let mut found = Vec::new();
    for entry in fs_err::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_file() && name.ends_with(extension) {
            found.push(name);
        }
    }
    found.sort();
    match found.as_slice() {
        [] => bail!("No {extension} file found in {}", dir.display()),
        [single] => Ok(single.clone()),
        [..] => bail!(
            "Expected a single {extension} file in {}, found {}",
            dir.display(),
            found.join(", ")
        ),
    }
}

fn sha256_file(path: &Path) -> Result<String> {
    let contents = fs_err::read(path)?;
    let hash = Sha256::digest(&contents);
    Ok(format!("{hash:x}"))
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .with_context(|| format!("Invalid file name {}", path.display()))
}

/// `MAJOR.MINOR` of a Python version.
fn major_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// The channel index written by conda-build.
#[derive(Debug, Deserialize)]
struct RepoData {
    #[serde(default)]
    packages: BTreeMap<String, IgnoredAny>,
    #[serde(default, rename = "packages.conda")]
    packages_conda: BTreeMap<String, IgnoredAny>,
}

/// File names of every package listed in a `repodata.json`.
fn read_repodata(path: &Path) -> Result<Vec<String>> {
    let content = fs_err::read_to_string(path)?;
    let repodata: RepoData = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(repodata
        .packages
        .into_keys()
        .chain(repodata.packages_conda.into_keys())
        .collect())
}
