pub(crate) mod builder;
pub(crate) mod environment;
pub(crate) mod process;
pub(crate) mod project;
pub(crate) mod shell;
#[cfg(test)]
pub(crate) mod temp_path;
pub(crate) mod toolchain;
pub(crate) mod version;

pub(crate) mod build;
pub mod cli;

pub(crate) type Result<T, E = Box<dyn std::error::Error + Send + Sync + 'static>> =
    std::result::Result<T, E>;
