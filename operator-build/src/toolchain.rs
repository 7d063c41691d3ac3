use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::PathBuf,
};

use log::debug;

use crate::{environment::CompileEnvironment, process};

#[derive(Debug)]
pub struct GoBuildOptions {
    /// Where the compiled binary is written.
    pub binary: PathBuf,
    /// The import path of the main package.
    pub package: String,
    pub args: Vec<OsString>,
    pub env: CompileEnvironment,
}

#[derive(Debug)]
pub struct ToolchainError(pub process::Error);

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ToolchainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<process::Error> for ToolchainError {
    fn from(value: process::Error) -> Self {
        Self(value)
    }
}

pub trait Toolchain {
    fn build(&self, options: &GoBuildOptions) -> Result<(), ToolchainError>;
}

/// Compiles with the `go` command found on the `PATH`.
pub struct GoToolchain;

impl Toolchain for GoToolchain {
    fn build(&self, options: &GoBuildOptions) -> Result<(), ToolchainError> {
        let GoBuildOptions {
            binary,
            package,
            args,
            env,
        } = options;
        debug!("compiling {package} into {binary:?}");

        process::command!("go", "build", "-o", binary)
            .args(args.iter().map(OsStr::new))
            .args([OsStr::new(package)])
            .env_exact(env.iter())
            .status()?;
        Ok(())
    }
}
