use crate::common::condify_command;

#[test]
fn help_lists_commands() {
    let output = condify_command()
        .arg("--help")
        .output()
        .expect("Failed to execute condify");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for command in ["build", "install-requirements", "translate", "select"] {
        assert!(stdout.contains(command), "missing `{command}` in: {stdout}");
    }
    assert!(stdout.contains("--python <EXE>"));
}

#[test]
fn help_build() {
    let output = condify_command()
        .args(["help", "build"])
        .output()
        .expect("Failed to execute condify");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Build a conda package"));
    assert!(stdout.contains("--from-downloaded-wheel"));
    assert!(stdout.contains("--conda-name-differences"));
    assert!(stdout.contains("--build-number"));
}

#[test]
fn version_flag_shows_version() {
    for flag in ["--version", "-V"] {
        let output = condify_command()
            .arg(flag)
            .output()
            .expect("Failed to execute condify");
        let stdout = String::from_utf8_lossy(&output.stdout);

        assert!(output.status.success());
        assert!(
            stdout.starts_with("condify "),
            "Expected version string starting with 'condify ', got: {stdout}"
        );
    }
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let output = condify_command()
        .output()
        .expect("Failed to execute condify");
    assert_eq!(output.status.code(), Some(2));
}
