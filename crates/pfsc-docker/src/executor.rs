use std::process::Stdio;

use crate::docker::DockerError;

/// Abstraction over docker CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
/// `args` never include the program itself.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Execute a docker command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, DockerError>;

    /// Execute a docker command with data piped to stdin, streaming its
    /// output to the terminal.
    async fn exec_with_stdin(&self, args: &[String], stdin_data: &[u8]) -> Result<(), DockerError>;
}

/// Runs the configured container-build command.
///
/// The command may be several words (e.g. `sudo docker`); the first is the
/// program and the rest are passed before every argument list.
#[derive(Debug, Clone)]
pub struct RealExecutor {
    program: String,
    prefix: Vec<String>,
}

impl RealExecutor {
    pub fn new(docker_cmd: &str) -> Result<Self, DockerError> {
        let mut words = docker_cmd.split_whitespace().map(str::to_owned);
        let program = words.next().ok_or(DockerError::EmptyCommand)?;
        Ok(Self {
            program,
            prefix: words.collect(),
        })
    }

    fn command(&self, args: &[String]) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.prefix).args(args);
        cmd
    }

    fn not_found(&self, source: std::io::Error) -> DockerError {
        DockerError::NotFound {
            program: self.program.clone(),
            source,
        }
    }

    fn full_args(&self, args: &[String]) -> Vec<String> {
        self.prefix.iter().chain(args).cloned().collect()
    }
}

impl DockerExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, DockerError> {
        tracing::debug!(program = %self.program, ?args, "exec");
        let output = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.not_found(e))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| DockerError::InvalidUtf8 { source: e })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(DockerError::CommandFailed {
                args: self.full_args(args),
                stderr,
            })
        }
    }

    async fn exec_with_stdin(&self, args: &[String], stdin_data: &[u8]) -> Result<(), DockerError> {
        use tokio::io::AsyncWriteExt;

        tracing::debug!(program = %self.program, ?args, stdin_bytes = stdin_data.len(), "exec with stdin");
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.not_found(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(stdin_data)
                .await
                .map_err(|e| DockerError::StdinWrite { source: e })?;
            stdin
                .shutdown()
                .await
                .map_err(|e| DockerError::StdinWrite { source: e })?;
        }

        let status = child.wait().await.map_err(|e| self.not_found(e))?;
        if status.success() {
            Ok(())
        } else {
            Err(DockerError::CommandFailed {
                args: self.full_args(args),
                stderr: format!("exit code: {status}"),
            })
        }
    }
}
