//! Temporary staging directories inside the build context.
//!
//! Files an image needs beyond the sources (generated configs, the EULA,
//! the license file) are written to a fresh directory under
//! `{pfsc_root}/src/tmp`, which Dockerfiles reference by its path relative
//! to `{pfsc_root}/src`. The directory is removed when the guard drops.

use std::path::{Path, PathBuf};

use pfsc_core::paths::{src_root, src_tmp_root};
use tempfile::TempDir;

/// Contents of the `.dockerignore` written at the root of the build context.
pub const DOCKERIGNORE: &str = "**/__pycache__\n**/*.pyc\n";

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Core(#[from] pfsc_core::Error),

    #[error("could not create a temporary directory under {path}")]
    TempDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("staging directory {path} is outside the build context")]
    OutsideContext {
        path: PathBuf,
        source: std::path::StripPrefixError,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// RAII guard over one staging directory.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
    relative: String,
}

impl StagingDir {
    /// Create a new directory under `{pfsc_root}/src/tmp`, creating that parent if needed.
    pub fn new(pfsc_root: &Path) -> Result<Self, StageError> {
        let tmp_root = src_tmp_root(pfsc_root);
        pfsc_core::make_dirs(&tmp_root, true)?;
        let dir = TempDir::new_in(&tmp_root).map_err(|e| StageError::TempDir {
            path: tmp_root.clone(),
            source: e,
        })?;

        let relative = dir
            .path()
            .strip_prefix(src_root(pfsc_root))
            .map_err(|e| StageError::OutsideContext {
                path: dir.path().to_path_buf(),
                source: e,
            })?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        tracing::debug!(path = %dir.path().display(), %relative, "staging directory created");
        Ok(Self { dir, relative })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path relative to `{pfsc_root}/src`, with `/` separators, as used in Dockerfiles.
    pub fn relative_path(&self) -> &str {
        &self.relative
    }

    /// Write `contents` to `name` inside the directory.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf, StageError> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).map_err(|e| StageError::Write {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "staged file");
        Ok(path)
    }

    /// Copy an existing file in under `name`.
    pub fn copy_in(&self, source: &Path, name: &str) -> Result<PathBuf, StageError> {
        let contents = std::fs::read_to_string(source).map_err(|e| StageError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        self.write(name, &contents)
    }
}

/// Write [`DOCKERIGNORE`] at the root of the build context.
pub fn write_dockerignore(pfsc_root: &Path) -> Result<(), StageError> {
    let path = src_root(pfsc_root).join(".dockerignore");
    std::fs::write(&path, DOCKERIGNORE).map_err(|e| StageError::Write { path, source: e })
}
