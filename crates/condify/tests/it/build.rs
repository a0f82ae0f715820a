use crate::common::{INSTA_FILTERS, condify_command, condify_in_conda_env, project_with};
use crate::condify_snapshot;

#[test]
fn requires_conda_environment() {
    let project = project_with(&[("setup.py", "")]);
    let mut command = condify_command();
    command.arg("build").arg(project.path());
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    error: Cannot use condify outside of a conda environment (CONDA_PREFIX is not set)
    ");
}

#[test]
fn not_a_project() {
    let project = project_with(&[("README.md", "# spam\n")]);
    let output = condify_in_conda_env()
        .arg("build")
        .arg(project.path())
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("does not look like a Python project directory"));
}

#[test]
fn conflicting_wheel_sources() {
    let project = project_with(&[("setup.py", "")]);
    let output = condify_in_conda_env()
        .args(["build", "--from-wheel", "--from-downloaded-wheel"])
        .arg(project.path())
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("cannot be used with"));
}
