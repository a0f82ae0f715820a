use crate::common::{condify_in_conda_env, condify_command, project_with};

#[test]
fn quiet_keeps_results() {
    let output = condify_command()
        .args(["--quiet", "translate", "foo; os_name == 'posix'"])
        .output()
        .expect("Failed to execute condify");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "foo # [unix]\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn quiet_suppresses_progress() {
    let project = project_with(&[("pyproject.toml", "[project]\nname = \"spam\"\ndependencies = []\n")]);
    let output = condify_in_conda_env()
        .args(["-q", "install-requirements", "--dry-run", "--python-version", "3.11"])
        .arg(project.path())
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(stderr.is_empty(), "Expected no output with --quiet, got: {stderr}");
}

#[test]
fn verbose_shows_debug_messages() {
    let project = project_with(&[("pyproject.toml", "[project]\nname = \"spam\"\ndependencies = []\n")]);
    let output = condify_in_conda_env()
        .args(["-v", "install-requirements", "--dry-run", "--python-version", "3.11"])
        .arg(project.path())
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(stderr.contains("debug: No name differences"), "{stderr}");
    assert!(stderr.contains("No run requirements"));
}
