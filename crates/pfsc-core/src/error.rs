use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}. Please correct your conf.toml")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to resolve directory {path}")]
    RootResolve {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not make directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("directory {0} already exists")]
    DirExists(PathBuf),

    #[error("{key} must be set in conf.toml when {needed_for}")]
    MissingSetting {
        key: &'static str,
        needed_for: &'static str,
    },

    // ── pfsc-server metadata ──
    #[error("failed to read {path}")]
    ServerFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing [versions] key '{key}' in {path}")]
    MissingVersion { path: PathBuf, key: &'static str },

    #[error("could not find version number in pfsc-server ({path})")]
    MissingServerVersion { path: PathBuf },
}
