//! conda-build recipes: `meta.yaml` and `conda_build_config.yaml`.

mod yaml;

pub use yaml::{Node, python_repr};

/// The `meta.yaml` of a Python package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Conda package name.
    pub name: String,
    pub version: String,
    /// Distribution file name, relative to the directory above the recipe.
    pub source: String,
    pub sha256: String,
    /// What `pip install` is pointed at: `.` for an sdist, else the wheel.
    pub pip_target: String,
    pub build_number: u32,
    pub noarch: bool,
    pub build_string: Option<String>,
    pub ignore_run_exports: Vec<String>,
    pub entry_points: Vec<String>,
    pub compilers: bool,
    /// Translated build requirements, installed into the host environment.
    pub host_requires: Vec<String>,
    /// Translated run requirements.
    pub run_requires: Vec<String>,
    pub home: Option<String>,
    pub summary: Option<String>,
    pub license: Option<String>,
    /// License file name, relative to the directory above the recipe.
    pub license_file: Option<String>,
}

impl Recipe {
    pub fn to_node(&self) -> Node {
        let package = vec![
            entry("name", Node::scalar(&self.name)),
            entry("version", Node::scalar(&self.version)),
        ];

        let source = vec![
            entry("url", Node::scalar(format!("../{}", self.source))),
            entry("sha256", Node::scalar(&self.sha256)),
        ];

        let mut build = vec![
            entry(
                "script",
                Node::scalar(format!("{{{{ PYTHON }}}} -m pip install {}", self.pip_target)),
            ),
            entry("number", Node::scalar(self.build_number)),
        ];
        if self.noarch {
            build.push(entry("noarch", Node::scalar("python")));
        }
        if let Some(string) = &self.build_string {
            build.push(entry("string", Node::scalar(string)));
        }
        if !self.ignore_run_exports.is_empty() {
            build.push(entry(
                "ignore_run_exports",
                Node::list(&self.ignore_run_exports),
            ));
        }
        if !self.entry_points.is_empty() {
            build.push(entry("entry_points", Node::list(&self.entry_points)));
        }

        let mut requirements = Vec::new();
        if self.compilers {
            requirements.push(entry(
                "build",
                Node::list(["{{ compiler('c') }}", "{{ compiler('cxx') }}"]),
            ));
        }
        let host = ["python", "pip", "wheel"]
            .into_iter()
            .map(str::to_owned)
            .chain(self.host_requires.iter().cloned());
        requirements.push(entry("host", Node::list(host)));
        let run = std::iter::once("python".to_owned()).chain(self.run_requires.iter().cloned());
        requirements.push(entry("run", Node::list(run)));

        let mut about = Vec::new();
        if let Some(home) = &self.home {
            about.push(entry("home", Node::scalar(home)));
        }
        if let Some(summary) = &self.summary {
            about.push(entry("summary", Node::scalar(python_repr(summary))));
        }
        if let Some(license) = &self.license {
            about.push(entry("license", Node::scalar(python_repr(license))));
        }
        if let Some(license_file) = &self.license_file {
            about.push(entry("license_file", Node::scalar(format!("../{license_file}"))));
        }

        let mut root = vec![
            entry("package", Node::Map(package)),
            entry("source", Node::Map(source)),
            entry("build", Node::Map(build)),
            entry("requirements", Node::Map(requirements)),
        ];
        if !about.is_empty() {
            root.push(entry("about", Node::Map(about)));
        }
        Node::Map(root)
    }

    /// Render `meta.yaml`.
    pub fn to_meta_yaml(&self) -> String {
        self.to_node().render()
    }
}

/// Render `conda_build_config.yaml`, the Python versions to build for.
pub fn build_config_yaml(pythons: &[String]) -> String {
    Node::Map(vec![entry("python", Node::list(pythons))]).render()
}

fn entry(key: &str, value: Node) -> (String, Node) {
    (key.to_owned(), value)
}
