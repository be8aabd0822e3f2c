//! Artifact generation for pfsc-manage.
//!
//! Renders Dockerfiles and configuration files from embedded templates,
//! stages per-build inputs in temporary directories under the build context,
//! and assembles docker-compose deployments from service-definition builders.
//! Nothing here runs docker; see the `pfsc-docker` crate for that.

pub mod compose;
pub mod conf;
pub mod dockerfile;
pub mod gdb;
pub mod header;
pub mod license;
pub mod services;
pub mod staging;
pub mod targets;
pub mod templates;

pub use compose::{ComposeError, ComposeFile, DeployOptions, Deployment};
pub use gdb::{GdbCode, UnknownGdbCode, parse_gdb_list};
pub use header::strip_headers;
pub use license::{Package, parse_pip_freeze};
pub use services::ServiceDefinition;
pub use staging::{StageError, StagingDir};
pub use targets::{BuildTarget, PrepareError, PreconditionError, PreparedBuild};
pub use templates::{Renderer, TemplateError, squash};
