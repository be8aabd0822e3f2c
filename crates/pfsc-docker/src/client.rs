use std::path::PathBuf;

use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor};

/// One `docker build` with the Dockerfile supplied on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub image: String,
    pub tag: String,
    /// Build context directory.
    pub context: PathBuf,
    pub dockerfile: String,
}

impl BuildRequest {
    /// `{image}:{tag}`
    pub fn reference(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    fn args(&self) -> Vec<String> {
        vec![
            "build".to_owned(),
            "-f-".to_owned(),
            "-t".to_owned(),
            self.reference(),
            self.context.display().to_string(),
        ]
    }
}

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    docker_cmd: String,
    executor: E,
}

impl DockerClient<RealExecutor> {
    /// Client running `docker_cmd`, which may be several words.
    pub fn new(docker_cmd: &str) -> Result<Self, DockerError> {
        Ok(Self {
            docker_cmd: docker_cmd.trim().to_owned(),
            executor: RealExecutor::new(docker_cmd)?,
        })
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    /// `docker_cmd` is only used to display command lines.
    pub fn with_executor(docker_cmd: impl Into<String>, executor: E) -> Self {
        Self {
            docker_cmd: docker_cmd.into(),
            executor,
        }
    }

    /// The command line `build` runs, as shown to the user.
    pub fn command_line(&self, req: &BuildRequest) -> String {
        format!("{} {}", self.docker_cmd, req.args().join(" "))
    }

    /// Run `req`, piping its Dockerfile to stdin. In dry-run mode nothing is executed.
    ///
    /// A non-zero exit status is reported as [`DockerError::CommandFailed`].
    pub async fn build(&self, req: &BuildRequest, dry_run: bool) -> Result<(), DockerError> {
        if dry_run {
            tracing::info!(image = %req.reference(), "dry run; skipping docker build");
            return Ok(());
        }
        tracing::info!(image = %req.reference(), context = %req.context.display(), "docker build");
        self.executor
            .exec_with_stdin(&req.args(), req.dockerfile.as_bytes())
            .await
    }

    /// `pip list --format=freeze` inside a throwaway container of `image`.
    pub async fn pip_freeze(&self, image: &str) -> Result<String, DockerError> {
        tracing::info!(%image, "listing installed python packages");
        self.executor
            .exec(&args([
                "run",
                "--rm",
                "--entrypoint",
                "pip",
                image,
                "list",
                "--format=freeze",
            ]))
            .await
    }
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}
