use std::process::Output;

use crate::common::{INSTA_FILTERS, condify_command, condify_in_conda_env, project_with};
use crate::condify_snapshot;

const SPAM_PYPROJECT: &str = r#"
[build-system]
requires = ["setuptools>=64", "wheel"]

[project]
name = "spam"
dependencies = [
    "numpy>=1.20",
    "tomli; python_version < '3.11'",
    "typing_extensions; python_version < '3.12'",
    "eggs~=1.4.2",
]

[tool.condify]
channels = ["conda-forge"]

[tool.condify.conda-name-differences]
eggs = "eggs-conda"
"#;

/// The argv of every `[running]:` line on stderr.
fn running_commands(output: &Output) -> Vec<Vec<String>> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter_map(|line| line.strip_prefix("[running]: "))
        .map(|command| shlex::split(command).expect("Invalid shell quoting"))
        .collect()
}

#[test]
fn requires_conda_environment() {
    let project = project_with(&[("pyproject.toml", SPAM_PYPROJECT)]);
    let mut command = condify_command();
    command
        .args(["install-requirements", "--dry-run"])
        .arg(project.path());
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    error: Cannot use condify outside of a conda environment (CONDA_PREFIX is not set)
    ");
}

#[test]
fn dry_run_installs_build_then_run_requirements() {
    let project = project_with(&[("pyproject.toml", SPAM_PYPROJECT)]);
    let output = condify_in_conda_env()
        .args(["install-requirements", "--dry-run", "--python-version", "3.11"])
        .arg(project.path())
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "{stderr}");
    assert!(stderr.contains("Using build requirements from [build-system] requires in pyproject.toml"));
    assert!(stderr.contains("Using run requirements from [project] dependencies in pyproject.toml"));
    assert!(stderr.contains("Using extra channels from [tool.condify] channels in pyproject.toml"));

    assert_eq!(
        running_commands(&output),
        [
            vec![
                "conda",
                "install",
                "-y",
                "--channel",
                "conda-forge",
                "setuptools>=64",
                "wheel",
            ],
            vec![
                "conda",
                "install",
                "-y",
                "--channel",
                "conda-forge",
                "numpy>=1.20",
                "typing-extensions",
                "eggs-conda>=1.4.2,==1.4",
            ],
        ]
    );
}

#[test]
fn command_line_overrides_configuration() {
    let project = project_with(&[("pyproject.toml", SPAM_PYPROJECT)]);
    let output = condify_in_conda_env()
        .args([
            "install-requirements",
            "--dry-run",
            "--python-version",
            "3.9",
            "--setup-requires",
            "flit_core>=3.2,<4",
            "--install-requires",
            "requests, tomli; python_version < '3.11'",
            "--channels",
            "labscript-suite",
        ])
        .arg(project.path())
        .output()
        .expect("Failed to execute condify");

    assert!(output.status.success());
    assert_eq!(
        running_commands(&output),
        [
            vec![
                "conda",
                "install",
                "-y",
                "--channel",
                "labscript-suite",
                "flit_core>=3.2,<4",
            ],
            vec![
                "conda",
                "install",
                "-y",
                "--channel",
                "labscript-suite",
                "requests",
                "tomli",
            ],
        ]
    );
}

#[test]
fn own_projects_and_duplicates_are_skipped() {
    let spam = project_with(&[(
        "pyproject.toml",
        r#"
[project]
name = "spam"
dependencies = ["eggs>=1.0", "numpy"]
"#,
    )]);
    let eggs = project_with(&[(
        "setup.cfg",
        "[metadata]\nname = eggs\n\n[condify]\nsetup_requires = setuptools\ninstall_requires =\n    numpy\n    spam\n",
    )]);

    let output = condify_in_conda_env()
        .args(["install-requirements", "--dry-run", "--python-version", "3.12"])
        .arg(spam.path())
        .arg(eggs.path())
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "{stderr}");
    assert!(stderr.contains("Ignoring requirement eggs>=1.0"));
    assert!(stderr.contains("Ignoring requirement spam"));
    assert_eq!(
        running_commands(&output),
        [
            vec!["conda", "install", "-y", "setuptools"],
            vec!["conda", "install", "-y", "numpy"],
        ]
    );
}

#[test]
fn untranslatable_requirement() {
    let project = project_with(&[(
        "pyproject.toml",
        "[build-system]\nrequires = [\"flit_core===3.9\"]\n",
    )]);
    let mut command = condify_in_conda_env();
    command
        .args(["install-requirements", "--dry-run", "--python-version", "3.11"])
        .arg(project.path());
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Getting build requirements...
    Using build requirements from [build-system] requires in pyproject.toml
    error: Failed to translate the requirements of [TEMP_DIR]
      Caused by: the `===` (arbitrary equality) version operator in `===3.9` has no conda equivalent and is not supported
    ");
}

#[test]
fn not_a_project() {
    let project = project_with(&[("README.md", "# spam\n")]);
    let output = condify_in_conda_env()
        .args(["install-requirements", "--dry-run", "--python-version", "3.11"])
        .arg(project.path())
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("does not look like a Python project directory"));
}
