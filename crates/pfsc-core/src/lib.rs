//! Core types and configuration for pfsc-manage.
//!
//! This crate defines the `conf.toml` schema ([`Settings`]), the rules for
//! resolving path-valued settings against the installation root, readers
//! for pfsc-server metadata, and shared error types.

pub mod config;
pub mod error;
pub mod paths;
pub mod versions;

pub use config::{FsPathVar, Settings, SoftwareVersions};
pub use error::{Error, Result};
pub use paths::{check_app_url_prefix, make_dirs, resolve_fs_path};
