//! Project discovery: recognise a Python project directory and work out how
//! to invoke its setup script.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Files that mark a directory as a Python project.
const SETUP_PY: &str = "setup.py";
const SETUP_CFG: &str = "setup.cfg";
const PYPROJECT_TOML: &str = "pyproject.toml";

/// Stand-in for `setup.py` in projects configured purely declaratively.
const SETUP_PY_STUB: &str =
    r#"import sys, setuptools; sys.argv[0] = __file__ = "setup.py"; setuptools.setup()"#;

/// A Python project on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    has_setup_py: bool,
}

impl Project {
    /// Recognise `dir` as a project directory.
    ///
    /// The directory must contain a `setup.py`, `setup.cfg` or
    /// `pyproject.toml`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let root = std::path::absolute(dir)
            .with_context(|| format!("Failed to resolve {}", dir.display()))?;
        if !root.is_dir() {
            bail!("Project directory {} does not exist", root.display());
        }

        let has_setup_py = root.join(SETUP_PY).is_file();
        let has_config = [SETUP_CFG, PYPROJECT_TOML]
            .iter()
            .any(|name| root.join(name).is_file());
        if !has_setup_py && !has_config {
            bail!(
                "{} does not look like a Python project directory: contains no {SETUP_PY}, {SETUP_CFG} or {PYPROJECT_TOML}",
                root.display()
            );
        }

        Ok(Self { root, has_setup_py })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Arguments that stand for `setup.py` on a Python command line.
    pub fn setup_args(&self) -> Vec<&'static str> {
        if self.has_setup_py {
            vec![SETUP_PY]
        } else {
            vec!["-c", SETUP_PY_STUB]
        }
    }

    /// `<python> setup.py`, run from the project root.
    pub fn setup_command(&self, python: &str) -> Command {
        let mut command = Command::new(python);
        command.args(self.setup_args()).current_dir(&self.root);
        command
    }

    /// The directory name, used when nothing better is known.
    pub fn dir_name(&self) -> String {
        self.root
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("project")
            .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn setup_py_project() {
        let dir = TempDir::new().unwrap();
        fs_err::write(dir.path().join("setup.py"), "").unwrap();
        fs_err::write(dir.path().join("setup.cfg"), "").unwrap();

        let project = Project::discover(dir.path()).unwrap();
        assert_eq!(project.setup_args(), ["setup.py"]);
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn declarative_project_uses_stub() {
        let dir = TempDir::new().unwrap();
        fs_err::write(dir.path().join("pyproject.toml"), "").unwrap();

        let project = Project::discover(dir.path()).unwrap();
        let args = project.setup_args();
        assert_eq!(args[0], "-c");
        assert!(args[1].ends_with("setuptools.setup()"));

        let command = project.setup_command("python3");
        assert_eq!(command.get_program(), "python3");
        assert_eq!(command.get_current_dir(), Some(dir.path()));
    }

    #[test]
    fn not_a_project() {
        let dir = TempDir::new().unwrap();
        let err = Project::discover(dir.path()).unwrap_err();
        assert!(
            err.to_string()
                .contains("does not look like a Python project directory")
        );
    }

    #[test]
    fn missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = Project::discover(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn directory_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("my-project");
        fs_err::create_dir(&root).unwrap();
        fs_err::write(root.join("setup.cfg"), "").unwrap();
        assert_eq!(Project::discover(&root).unwrap().dir_name(), "my-project");
    }
}
