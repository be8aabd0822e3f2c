#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("no container-build command configured; set [docker].cmd in conf.toml")]
    EmptyCommand,

    #[error("could not run `{program}`. Is docker installed and on your PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("docker command failed: {args:?}\n{stderr}")]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("docker output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("failed to write to docker stdin")]
    StdinWrite { source: std::io::Error },
}
