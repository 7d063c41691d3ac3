use clap::Parser;
use constcat::concat;

use crate::{
    build::{self, BuildRequest, Tools},
    builder::{ImageBuilder, ProcessExecutor, UnsupportedImageBuilder},
    project::{self, GoProject},
    toolchain::GoToolchain,
    version::VERSION,
    Result,
};

const LONG_ABOUT: &str = concat!(
    "Compiles the operator code into an executable binary and builds a container image from \"",
    project::DOCKERFILE,
    "\".\n\n",
    "<IMAGE> is the container image to be built, e.g. \"quay.io/example/operator:v0.0.1\". ",
    "Pass --skip-image to only build the operator binary.\n\n",
    "The image is built locally and still needs to be pushed to a remote registry, for example:\n\n",
    "    $ operator-build quay.io/example/operator:v0.0.1\n",
    "    $ docker push quay.io/example/operator:v0.0.1",
);

fn image_builder(value: &str) -> Result<ImageBuilder, UnsupportedImageBuilder> {
    value.parse()
}

#[derive(Debug, Parser)]
#[command(version = VERSION, about, long_about = LONG_ABOUT)]
pub struct Cli {
    /// The container image to build. Required unless --skip-image is set.
    image: Option<String>,

    /// Extra image build arguments as one string such as "--build-arg https_proxy=$https_proxy".
    #[arg(long = "image-build-args", default_value_t, allow_hyphen_values = true)]
    image_build_args: String,

    /// Tool to build OCI images. One of: [docker, podman, buildah]. Checked even with --skip-image.
    #[arg(long = "image-builder", default_value = "docker", value_parser = image_builder)]
    image_builder: ImageBuilder,

    /// Extra Go build arguments as one string such as "-ldflags -X=main.xyz=abc".
    #[arg(long = "go-build-args", default_value_t, allow_hyphen_values = true)]
    go_build_args: String,

    /// If set, only the operator binary is built and the container image build is skipped.
    #[arg(long = "skip-image", default_value_t)]
    skip_image: bool,
}

impl Cli {
    fn into_request(self) -> BuildRequest {
        let Cli {
            image,
            image_build_args,
            image_builder,
            go_build_args,
            skip_image,
        } = self;
        BuildRequest {
            image,
            image_builder,
            image_build_args,
            go_build_args,
            skip_image,
        }
    }

    pub fn run(self) -> Result<()> {
        let project = GoProject::new(std::env::current_dir()?);
        build::run(
            self.into_request(),
            Tools {
                project: &project,
                toolchain: &GoToolchain,
                executor: &ProcessExecutor,
                environment: std::env::vars_os().collect(),
            },
        )?;
        Ok(())
    }
}
