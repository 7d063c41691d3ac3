use std::{
    ffi::OsString,
    fmt, io,
    path::{Path, PathBuf},
};

use constcat::concat;

pub const BUILD_DIR: &str = "build";
pub const DOCKERFILE: &str = concat!(BUILD_DIR, "/Dockerfile");
pub const BUILD_BIN_DIR: &str = concat!(BUILD_DIR, "/_output/bin");
pub const MANAGER_DIR: &str = "cmd/manager";
pub const MANAGER_MAIN: &str = concat!(MANAGER_DIR, "/main.go");
pub const GO_MOD: &str = "go.mod";
/// Names the binary when the project root has no final component, as with `/`.
pub const FALLBACK_PROJECT_NAME: &str = "operator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Go,
    Ansible,
    Helm,
    Unknown,
}

impl ProjectKind {
    /// Whether the project contains an operator binary that has to be compiled.
    pub fn is_compilable(self) -> bool {
        matches!(self, ProjectKind::Go)
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectKind::Go => "Go",
            ProjectKind::Ansible => "Ansible",
            ProjectKind::Helm => "Helm",
            ProjectKind::Unknown => "unknown",
        })
    }
}

#[derive(Debug)]
pub enum ProjectError {
    NotProjectRoot { dir: PathBuf },
    Io { path: PathBuf, source: io::Error },
    MissingModuleDirective { path: PathBuf },
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::NotProjectRoot { dir } => write!(
                f,
                "must run command in project root dir: {dir:?} does not contain {DOCKERFILE:?}"
            ),
            ProjectError::Io { path, source } => write!(f, "unable to read {path:?}: {source}"),
            ProjectError::MissingModuleDirective { path } => {
                write!(f, "{path:?} does not declare a module path")
            }
        }
    }
}

impl std::error::Error for ProjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Answers questions about the operator project being built.
pub trait ProjectInspector {
    /// Fails unless the inspected directory is the root of an operator project.
    fn ensure_project_root(&self) -> Result<(), ProjectError>;

    fn kind(&self) -> Result<ProjectKind, ProjectError>;

    /// The absolute path of the project root.
    fn root(&self) -> Result<PathBuf, ProjectError>;

    /// The Go import path of the project's module.
    fn module_path(&self) -> Result<String, ProjectError>;
}

/// Inspects an operator project on disk.
pub struct GoProject {
    dir: PathBuf,
}

impl GoProject {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, relative: &str) -> Result<String, ProjectError> {
        let path = self.dir.join(relative);
        std::fs::read_to_string(&path).map_err(|source| ProjectError::Io { path, source })
    }
}

impl ProjectInspector for GoProject {
    fn ensure_project_root(&self) -> Result<(), ProjectError> {
        if self.dir.join(DOCKERFILE).is_file() {
            Ok(())
        } else {
            Err(ProjectError::NotProjectRoot {
                dir: self.dir.clone(),
            })
        }
    }

    fn kind(&self) -> Result<ProjectKind, ProjectError> {
        if self.dir.join(MANAGER_MAIN).is_file() {
            return Ok(ProjectKind::Go);
        }
        Ok(kind_from_dockerfile(&self.read(DOCKERFILE)?))
    }

    fn root(&self) -> Result<PathBuf, ProjectError> {
        std::path::absolute(&self.dir).map_err(|source| ProjectError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    fn module_path(&self) -> Result<String, ProjectError> {
        let go_mod = self.read(GO_MOD)?;
        parse_module_directive(&go_mod)
            .map(str::to_owned)
            .ok_or_else(|| ProjectError::MissingModuleDirective {
                path: self.dir.join(GO_MOD),
            })
    }
}

/// Guesses the kind of a project without Go sources from the base images in its Dockerfile.
fn kind_from_dockerfile(dockerfile: &str) -> ProjectKind {
    for line in dockerfile.lines() {
        let mut words = line.split_whitespace();
        if !words
            .next()
            .is_some_and(|instruction| instruction.eq_ignore_ascii_case("FROM"))
        {
            continue;
        }
        // Skip flags such as `--platform=...`.
        let Some(image) = words.find(|word| !word.starts_with("--")) else {
            continue;
        };
        if image.contains("ansible-operator") {
            return ProjectKind::Ansible;
        }
        if image.contains("helm-operator") {
            return ProjectKind::Helm;
        }
    }
    ProjectKind::Unknown
}

/// Returns the path declared by the `module` directive of a go.mod file.
fn parse_module_directive(go_mod: &str) -> Option<&str> {
    go_mod.lines().find_map(|line| {
        let line = line.split_once("//").map_or(line, |(code, _)| code).trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(|c: char| c.is_whitespace() || c == '"') {
            return None;
        }
        let path = rest.trim();
        let path = path
            .strip_prefix('"')
            .and_then(|path| path.strip_suffix('"'))
            .unwrap_or(path);
        (!path.is_empty()).then_some(path)
    })
}

/// Joins a Go import path with a slash separated relative package directory.
pub fn join_import_path(module: &str, package: &str) -> String {
    let module = module.trim_end_matches('/');
    let package = package.trim_matches('/');
    if package.is_empty() {
        module.to_owned()
    } else {
        format!("{module}/{package}")
    }
}

/// The name of the project, which is the last component of its root directory.
pub fn project_name(root: &Path) -> OsString {
    root.file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.into())
}
