// The `unreachable_pub` is to silence false positives in RustRover.
#![allow(dead_code, unreachable_pub)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Insta snapshot filters shared across condify tests.
pub const INSTA_FILTERS: &[(&str, &str)] = &[
    // Rewrite Windows output to Unix output
    (r"\\([\w\d]|\.)", "/$1"),
    (r"condify\.exe", "condify"),
    // condify version display
    (
        r"condify \d+\.\d+\.\d+(-(alpha|beta|rc)\.\d+)?(\+\d+)?",
        r"condify [VERSION]",
    ),
    // Temporary project directories
    (r"[^\s'`]*[/\\]\.tmp[\w]+", "[TEMP_DIR]"),
    // Trim end-of-line whitespaces
    (r"([^\s])[ \t]+(\r?\n)", "$1$2"),
];

/// Returns the condify binary that cargo built before launching the tests.
pub fn get_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_condify"))
}

/// Create a `condify` command for testing.
pub fn condify_command() -> Command {
    let mut command = Command::new(get_bin());
    // Clear environment variables that might interfere with tests.
    command.env_remove("CONDA_PREFIX");
    command.env_remove("CONDA_EXE");
    command.env_remove("CONDIFY_PYTHON");
    command.env_remove("RUST_LOG");
    command.env_remove("CLICOLOR_FORCE");
    command.env_remove("FORCE_COLOR");
    command
}

/// Create a `condify` command that runs inside a (pretend) conda environment.
pub fn condify_in_conda_env() -> Command {
    let mut command = condify_command();
    command.env("CONDA_PREFIX", "/opt/conda/envs/test");
    command
}

/// A temporary project directory containing the given files.
pub fn project_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::Builder::new()
        .prefix(".tmp")
        .tempdir()
        .expect("Failed to create temporary directory");
    for (name, contents) in files {
        write_file(dir.path(), name, contents);
    }
    dir
}

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent).expect("Failed to create directory");
    }
    fs_err::write(path, contents).expect("Failed to write file");
}

/// Snapshot test helper macro. Runs a command and asserts against an insta snapshot.
#[macro_export]
macro_rules! condify_snapshot {
    ($filters:expr, $command:expr, @$expected:literal) => {{
        let output = $command.output().expect("Failed to execute condify");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let mut combined = format!(
            "success: {:?}\nexit_code: {}\n----- stdout -----\n{}\n----- stderr -----\n{}",
            output.status.success(),
            output.status.code().unwrap_or(-1),
            stdout.trim(),
            stderr.trim(),
        );

        // Apply filters
        for (pattern, replacement) in $filters.iter() {
            let re = regex::Regex::new(pattern).expect("Invalid filter regex");
            combined = re.replace_all(&combined, *replacement).to_string();
        }

        insta::assert_snapshot!(combined, @$expected);
    }};
}
