//! Buildable images: names, preconditions, and staged inputs.

use std::fmt;
use std::path::{Path, PathBuf};

use pfsc_core::Settings;

use crate::conf::SupervisorPrograms;
use crate::staging::{self, StageError, StagingDir};
use crate::templates::{Renderer, TemplateError};

/// An image `pfsc build` knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTarget {
    Server { demos: bool },
    Oca { release: bool },
    Dummy,
    Static,
    ElkjsBuilder,
    Redis,
    RedisGraph,
}

/// A required input of a build is missing.
#[derive(Debug, thiserror::Error)]
#[error("could not find {what} at {path}. {hint}")]
pub struct PreconditionError {
    pub what: &'static str,
    pub path: PathBuf,
    pub hint: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Everything needed to run one `docker build`.
#[derive(Debug)]
pub struct PreparedBuild {
    pub image: &'static str,
    pub dockerfile: String,
    /// Extra `(title, text)` artifacts shown alongside the Dockerfile by `--dump`.
    pub dumps: Vec<(String, String)>,
    /// Staged inputs; removed when this value drops.
    pub staging: Option<StagingDir>,
}

impl BuildTarget {
    pub fn image(self) -> &'static str {
        match self {
            Self::Server { .. } => "pfsc-server",
            Self::Oca { .. } => "pise",
            Self::Dummy => "pfsc-dummy-server",
            Self::Static => "pfsc-static-nginx",
            Self::ElkjsBuilder => "elkjs-build-env",
            Self::Redis => "pfsc-redis",
            Self::RedisGraph => "pfsc-redisgraph",
        }
    }

    /// Check that every source directory the image copies from exists.
    pub fn check_preconditions(self, settings: &Settings) -> Result<(), PreconditionError> {
        let src = settings.src_root();
        match self {
            Self::Server { .. } => require_venv(&src),
            Self::Oca { release } => oca_readiness_checks(settings, release),
            Self::Dummy | Self::Static | Self::ElkjsBuilder | Self::Redis | Self::RedisGraph => {
                Ok(())
            }
        }
    }

    /// Stage inputs and render the Dockerfile for `tag`.
    pub fn prepare(self, renderer: &Renderer<'_>, tag: &str) -> Result<PreparedBuild, PrepareError> {
        let settings = renderer.settings();
        let pfsc_root = &settings.pfsc_root;
        let mut dumps = Vec::new();

        let (dockerfile, staging) = match self {
            Self::Server { demos } => (renderer.server_dockerfile(demos)?, None),
            Self::ElkjsBuilder => (renderer.elkjs_build_env_dockerfile()?, None),
            Self::Oca { release } => {
                let dir = StagingDir::new(pfsc_root)?;
                dir.write("eula.txt", &renderer.oca_eula(tag)?)?;
                dir.write(
                    "pfsc.ini",
                    &renderer.supervisor_pfsc_ini(SupervisorPrograms {
                        worker: false,
                        web: true,
                        use_venv: false,
                        oca: true,
                    })?,
                )?;
                dir.write("redisgraph.ini", &renderer.supervisor_redisgraph_ini(true)?)?;
                dir.write("redisgraph.conf", &renderer.redisgraph_conf()?)?;
                dir.copy_in(&oca_version_file(&settings.manage_root), "oca_version.txt")?;
                staging::write_dockerignore(pfsc_root)?;
                let df = renderer.oca_dockerfile(dir.relative_path(), release)?;
                (df, Some(dir))
            }
            Self::Dummy => {
                let dir = StagingDir::new(pfsc_root)?;
                dir.write("web.py", &renderer.dummy_web_py()?)?;
                let df = renderer.dummy_dockerfile(dir.relative_path())?;
                (df, Some(dir))
            }
            Self::Static => {
                let dir = StagingDir::new(pfsc_root)?;
                let conf = renderer.static_nginx_conf()?;
                let path = dir.write("nginx.conf", &conf)?;
                dumps.push((path.display().to_string(), conf));
                let df = renderer.static_dockerfile(dir.relative_path())?;
                (df, Some(dir))
            }
            Self::Redis => {
                let dir = StagingDir::new(pfsc_root)?;
                dir.write("redis.conf", &renderer.redis_conf()?)?;
                let df = renderer.redis_dockerfile(dir.relative_path())?;
                (df, Some(dir))
            }
            Self::RedisGraph => {
                let dir = StagingDir::new(pfsc_root)?;
                dir.write("redisgraph.conf", &renderer.redisgraph_conf()?)?;
                let df = renderer.redisgraph_dockerfile(dir.relative_path())?;
                (df, Some(dir))
            }
        };

        Ok(PreparedBuild {
            image: self.image(),
            dockerfile,
            dumps,
            staging,
        })
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.image())
    }
}

/// `{manage_root}/topics/pfsc`, where OCA data files under version control live.
pub fn oca_topic_dir(manage_root: &Path) -> PathBuf {
    manage_root.join("topics").join("pfsc")
}

pub fn oca_version_file(manage_root: &Path) -> PathBuf {
    oca_topic_dir(manage_root).join("oca_version.txt")
}

/// Version-controlled copy of the OCA combined license file.
pub fn oca_license_file(manage_root: &Path) -> PathBuf {
    oca_topic_dir(manage_root).join("oca_combined_license_file.txt")
}

fn require(what: &'static str, path: PathBuf, hint: &'static str) -> Result<(), PreconditionError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PreconditionError { what, path, hint })
    }
}

fn require_venv(src: &Path) -> Result<(), PreconditionError> {
    require(
        "the pfsc-server venv",
        src.join("pfsc-server").join("venv"),
        "Have you installed pfsc-server yet?",
    )
}

fn oca_readiness_checks(settings: &Settings, release: bool) -> Result<(), PreconditionError> {
    let src = settings.src_root();
    require_venv(&src)?;
    require(
        "the pfsc-ise build",
        src.join("pfsc-ise").join("dist"),
        "Have you built pfsc-ise yet?",
    )?;
    require(
        "the pdf.js build",
        src.join("pfsc-pdf").join("build").join("generic"),
        "Have you built pfsc-pdf yet?",
    )?;
    require(
        "pyodide",
        src.join("pyodide")
            .join(format!("v{}", settings.versions.pyodide)),
        "Did you run `pfsc get pyodide`?",
    )?;
    let (wheels, hint) = if release {
        (
            src.join("whl").join("release"),
            "Did you run `pfsc get wheels --release`?",
        )
    } else {
        (src.join("whl"), "Did you run `pfsc get wheels`?")
    };
    require("wheels", wheels, hint)
}
