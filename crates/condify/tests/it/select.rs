use crate::common::{INSTA_FILTERS, condify_command};
use crate::condify_snapshot;

const LINES: [&str; 4] = [
    "foo>=2.0 # [win]",
    "bar # [linux]",
    "importlib-metadata # [py<38]",
    "baz==2.3",
];

#[test]
fn select_for_windows() {
    let mut command = condify_command();
    command
        .args(["select", "--python-version", "3.7", "--platform", "win-64"])
        .args(LINES);
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    foo>=2.0
    importlib-metadata
    baz==2.3
    ----- stderr -----
    ");
}

#[test]
fn select_for_linux() {
    let mut command = condify_command();
    command
        .args(["select", "--python-version", "3.11", "--platform", "linux-64"])
        .args(LINES);
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    bar
    baz==2.3
    ----- stderr -----
    ");
}

#[test]
fn unknown_platform() {
    let mut command = condify_command();
    command.args([
        "select",
        "--python-version",
        "3.11",
        "--platform",
        "amiga-68k",
        "foo",
    ]);
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    error: unknown platform `amiga-68k`, expected one of: linux-64, linux-aarch64, linux-ppc64le, osx-64, osx-arm64, win-64, win-32
    ");
}

#[test]
fn unknown_selector_variable() {
    let output = condify_command()
        .args([
            "select",
            "--python-version",
            "3.11",
            "--platform",
            "osx-arm64",
            "foo # [freebsd]",
        ])
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("unknown selector variable `freebsd`"));
}

#[test]
fn deeply_nested_selector_is_rejected() {
    let line = format!("foo # [{}win{}]", "(".repeat(10_000), ")".repeat(10_000));
    let output = condify_command()
        .args(["select", "--python-version", "3.8", "--platform", "linux-64"])
        .arg(line)
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("selector nested too deeply"));
}
