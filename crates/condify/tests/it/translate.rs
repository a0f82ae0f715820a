use crate::common::{INSTA_FILTERS, condify_command};
use crate::condify_snapshot;

#[test]
fn translate_requirements() {
    let mut command = condify_command();
    command.args([
        "translate",
        "foo>=2.0; sys_platform=='win32'",
        "bar==2.3",
        "Foo_Bar ~= 1.4.2",
        "baz>=1.0,<2.0; python_version < '3.8' and os_name != 'nt'",
    ]);
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    foo>=2.0 # [win]
    bar==2.3
    foo-bar>=1.4.2,==1.4
    baz>=1.0,<2.0 # [py<38 and not win]
    ----- stderr -----
    ");
}

#[test]
fn translate_with_name_differences() {
    let mut command = condify_command();
    command.args([
        "translate",
        "--conda-name-differences",
        "PyQt5:pyqt, beautifulsoup4:beautiful-soup",
        "PyQt5>=5.12",
        "beautifulsoup4",
    ]);
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pyqt>=5.12
    beautiful-soup
    ----- stderr -----
    ");
}

#[test]
fn arbitrary_equality_is_rejected() {
    let mut command = condify_command();
    command.args(["translate", "good>=1.0", "foo===1.0"]);
    condify_snapshot!(&INSTA_FILTERS, command, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    error: the `===` (arbitrary equality) version operator in `===1.0` has no conda equivalent and is not supported
    ");
}

#[test]
fn invalid_name_differences() {
    let output = condify_command()
        .args(["translate", "--conda-name-differences", "PyQt5", "PyQt5"])
        .output()
        .expect("Failed to execute condify");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("Invalid --conda-name-differences"));
    assert!(stderr.contains("Caused by"));
}
