//! Compiles the operator binary and packages it into a container image.

use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    builder::{BuilderCommand, Executor, ImageBuilder},
    environment::CompileEnvironment,
    process,
    project::{self, ProjectError, ProjectInspector},
    shell::{self, SplitError},
    toolchain::{GoBuildOptions, Toolchain, ToolchainError},
};

/// The build context handed to the image builder.
pub const BUILD_CONTEXT: &str = ".";

/// Everything a single build invocation was asked to do.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub image: Option<String>,
    pub image_builder: ImageBuilder,
    /// Extra image builder arguments, split like a shell would.
    pub image_build_args: String,
    /// Extra compiler arguments, split on whitespace.
    pub go_build_args: String,
    pub skip_image: bool,
}

/// The external collaborators of a build.
pub struct Tools<'a> {
    pub project: &'a dyn ProjectInspector,
    pub toolchain: &'a dyn Toolchain,
    pub executor: &'a dyn Executor,
    /// The environment inherited by the compiler.
    pub environment: Vec<(OsString, OsString)>,
}

#[derive(Debug)]
pub enum UsageError {
    MissingImage,
    Project(ProjectError),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::MissingImage => {
                f.write_str("an image argument is required unless --skip-image is set")
            }
            UsageError::Project(error) => fmt::Display::fmt(error, f),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Usage(UsageError),
    ArgumentParse {
        flag: &'static str,
        source: SplitError,
    },
    Compile(ToolchainError),
    ImageBuild {
        image: String,
        source: process::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage(error) => fmt::Display::fmt(error, f),
            Error::ArgumentParse { flag, source } => {
                write!(f, "--{flag} is not parseable: {source}")
            }
            Error::Compile(source) => write!(f, "failed to build operator binary: {source}"),
            Error::ImageBuild { image, source } => {
                write!(f, "failed to build image {image}: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Usage(UsageError::MissingImage) => None,
            Error::Usage(UsageError::Project(source)) => Some(source),
            Error::ArgumentParse { source, .. } => Some(source),
            Error::Compile(source) => Some(source),
            Error::ImageBuild { source, .. } => Some(source),
        }
    }
}

impl From<ProjectError> for Error {
    fn from(value: ProjectError) -> Self {
        Error::Usage(UsageError::Project(value))
    }
}

/// Compiles the operator binary when the project has one, then builds the container image unless
/// `request.skip_image` is set.
pub fn run(request: BuildRequest, tools: Tools) -> Result<(), Error> {
    let BuildRequest {
        image,
        image_builder,
        image_build_args,
        go_build_args,
        skip_image,
    } = request;
    let Tools {
        project,
        toolchain,
        executor,
        environment,
    } = tools;

    let image = match (image, skip_image) {
        (_, true) => None,
        (Some(image), false) => Some(image),
        (None, false) => return Err(Error::Usage(UsageError::MissingImage)),
    };

    // Malformed extra arguments must be reported before the compiler runs.
    let image_build = image
        .map(|image| {
            BuilderCommand::image_build(
                image_builder,
                BUILD_CONTEXT,
                project::DOCKERFILE,
                &image,
                &image_build_args,
            )
            .map(|command| (image, command))
            .map_err(|source| Error::ArgumentParse {
                flag: "image-build-args",
                source,
            })
        })
        .transpose()?;

    project.ensure_project_root()?;

    let kind = project.kind()?;
    if kind.is_compilable() {
        compile(project, toolchain, environment, &go_build_args)?;
    } else {
        info!("Not compiling an operator binary for a project of kind {kind}");
    }

    if let Some((image, command)) = image_build {
        info!("Building OCI image {image}");

        if let Err(source) = executor.execute(command) {
            return Err(Error::ImageBuild { image, source });
        }
    } else {
        info!("Skipping image building");
    }

    info!("Operator build complete.");
    Ok(())
}

fn compile(
    project: &dyn ProjectInspector,
    toolchain: &dyn Toolchain,
    environment: Vec<(OsString, OsString)>,
    go_build_args: &str,
) -> Result<(), Error> {
    let root = project.root()?;
    let name = project::project_name(&root);

    let mut args = trim_path_args(&root);
    args.extend(shell::split_whitespace(go_build_args).into_iter().map(OsString::from));

    let options = GoBuildOptions {
        binary: binary_path(&root, &name),
        package: project::join_import_path(&project.module_path()?, project::MANAGER_DIR),
        args,
        env: CompileEnvironment::for_target(environment),
    };
    debug!("go build options: {options:?}");

    toolchain.build(&options).map_err(Error::Compile)
}

/// Compiler and assembler flags that strip the directory containing the project from file paths
/// recorded in the binary.
fn trim_path_args(root: &Path) -> Vec<OsString> {
    let parent = root.parent().unwrap_or(root);
    let mut trim_path = OsString::from("all=-trimpath=");
    trim_path.push(parent);
    vec![
        "-gcflags".into(),
        trim_path.clone(),
        "-asmflags".into(),
        trim_path,
    ]
}

fn binary_path(root: &Path, name: &OsStr) -> PathBuf {
    root.join(project::BUILD_BIN_DIR).join(name)
}
