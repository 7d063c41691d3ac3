use std::{ffi::OsStr, fmt, str::FromStr};

use crate::{
    process,
    shell::{self, SplitError},
};

/// The tools that can build OCI images from a Dockerfile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ImageBuilder {
    #[default]
    Docker,
    Podman,
    Buildah,
}

impl ImageBuilder {
    pub const ALL: [ImageBuilder; 3] = [
        ImageBuilder::Docker,
        ImageBuilder::Podman,
        ImageBuilder::Buildah,
    ];

    /// The name of the executable.
    pub const fn program(self) -> &'static str {
        match self {
            ImageBuilder::Docker => "docker",
            ImageBuilder::Podman => "podman",
            ImageBuilder::Buildah => "buildah",
        }
    }

    /// The leading arguments that build `image` from `dockerfile`. The build context is not included.
    fn template(self, dockerfile: &str, image: &str) -> Vec<String> {
        let leading: &[&str] = match self {
            ImageBuilder::Docker | ImageBuilder::Podman => &["build"],
            ImageBuilder::Buildah => &["bud", "--format=docker"],
        };
        leading
            .iter()
            .copied()
            .chain(["-f", dockerfile, "-t", image])
            .map(str::to_owned)
            .collect()
    }
}

impl fmt::Display for ImageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnsupportedImageBuilder(pub String);

impl fmt::Display for UnsupportedImageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a supported image builder, expected one of: ", self.0)?;
        for (index, builder) in ImageBuilder::ALL.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{builder}")?;
        }
        Ok(())
    }
}

impl std::error::Error for UnsupportedImageBuilder {}

impl FromStr for ImageBuilder {
    type Err = UnsupportedImageBuilder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageBuilder::ALL
            .into_iter()
            .find(|builder| builder.program() == s)
            .ok_or_else(|| UnsupportedImageBuilder(s.to_owned()))
    }
}

/// A fully assembled image builder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl BuilderCommand {
    /// Assembles the command that builds `image` from `dockerfile` with `context` as the build
    /// context. The shell-style `extra_args` are placed after the builder's own arguments and
    /// before the context, which always comes last.
    pub fn image_build(
        builder: ImageBuilder,
        context: &str,
        dockerfile: &str,
        image: &str,
        extra_args: &str,
    ) -> Result<Self, SplitError> {
        let mut args = builder.template(dockerfile, image);
        if !extra_args.is_empty() {
            args.extend(shell::split(extra_args)?);
        }
        args.push(context.to_owned());

        Ok(Self {
            program: builder.program(),
            args,
        })
    }
}

/// Runs assembled image builder commands.
pub trait Executor {
    fn execute(&self, command: BuilderCommand) -> Result<(), process::Error>;
}

/// Runs commands as child processes that share the terminal with this process.
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&self, command: BuilderCommand) -> Result<(), process::Error> {
        let BuilderCommand { program, args } = command;
        process::Command::new(program)
            .args(args.iter().map(OsStr::new))
            .status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(builder: ImageBuilder, extra_args: &str) -> Result<BuilderCommand, SplitError> {
        BuilderCommand::image_build(builder, ".", "build/Dockerfile", "x:y", extra_args)
    }

    #[test]
    fn test_docker() {
        let command = build(ImageBuilder::Docker, "").unwrap();
        assert_eq!(command.program, "docker");
        assert_eq!(
            command.args,
            ["build", "-f", "build/Dockerfile", "-t", "x:y", "."]
        );
    }

    #[test]
    fn test_podman() {
        let command = build(ImageBuilder::Podman, "").unwrap();
        assert_eq!(command.program, "podman");
        assert_eq!(
            command.args,
            ["build", "-f", "build/Dockerfile", "-t", "x:y", "."]
        );
    }

    #[test]
    fn test_buildah() {
        let command = build(ImageBuilder::Buildah, "").unwrap();
        assert_eq!(command.program, "buildah");
        assert_eq!(
            command.args,
            ["bud", "--format=docker", "-f", "build/Dockerfile", "-t", "x:y", "."]
        );
    }

    #[test]
    fn test_extra_args_precede_context() {
        let command = build(
            ImageBuilder::Docker,
            r#"--build-arg "GREETING=hello world" --no-cache"#,
        )
        .unwrap();
        assert_eq!(
            command.args,
            [
                "build",
                "-f",
                "build/Dockerfile",
                "-t",
                "x:y",
                "--build-arg",
                "GREETING=hello world",
                "--no-cache",
                "."
            ]
        );
    }

    #[test]
    fn test_whitespace_extra_args_add_nothing() {
        let command = build(ImageBuilder::Buildah, "   ").unwrap();
        assert_eq!(command.args.last().map(String::as_str), Some("."));
        assert_eq!(command.args.len(), 7);
    }

    #[test]
    fn test_unbalanced_extra_args() {
        let error = build(ImageBuilder::Docker, "--label 'oops").unwrap_err();
        assert_eq!(error.input, "--label 'oops");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("docker".parse(), Ok(ImageBuilder::Docker));
        assert_eq!("podman".parse(), Ok(ImageBuilder::Podman));
        assert_eq!("buildah".parse(), Ok(ImageBuilder::Buildah));
    }

    #[test]
    fn test_unsupported_builder() {
        let error = "kaniko".parse::<ImageBuilder>().unwrap_err();
        assert_eq!(error, UnsupportedImageBuilder("kaniko".to_owned()));
        assert_eq!(
            error.to_string(),
            "kaniko is not a supported image builder, expected one of: docker, podman, buildah"
        );
        assert!("Docker".parse::<ImageBuilder>().is_err());
    }
}
