use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::{check_app_url_prefix, resolve_fs_path};

/// Name of the settings file looked up in the manage root.
pub const CONFIG_FILE_NAME: &str = "conf.toml";

/// conf.toml configuration
///
/// Loaded once at startup and passed by reference everywhere else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding `conf.toml` and the `topics/` data files.
    #[serde(skip)]
    pub manage_root: PathBuf,
    /// Installation root; path-valued settings are relative to it.
    #[serde(skip)]
    pub pfsc_root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub ise: IseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub redisgraph: RedisGraphConfig,
    #[serde(default)]
    pub redisinsight: RedisInsightConfig,
    #[serde(default)]
    pub neo4j: Neo4jConfig,
    #[serde(default)]
    pub tinkergraph: TinkerGraphConfig,
    #[serde(default)]
    pub janusgraph: JanusGraphConfig,
    #[serde(default)]
    pub neptune: NeptuneConfig,
    #[serde(default)]
    pub nginx: NginxConfig,
    #[serde(default)]
    pub versions: SoftwareVersions,
}

/// Filesystem overrides. Each is `None`, absolute, or relative to `pfsc_root`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Installation root (defaults to the parent of the manage root)
    pub pfsc_root: Option<String>,
    pub lib_root: Option<String>,
    pub build_root: Option<String>,
    pub graphdb_root: Option<String>,
    pub email_template_dir: Option<String>,
    pub twin_root_dir: Option<String>,
    pub maintenance_site_dir: Option<String>,
    pub ssl_cert: Option<String>,
    pub ssl_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    /// Container-build executable
    #[serde(default = "default_docker_cmd")]
    pub cmd: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebConfig {
    /// Optional prefix before all ISE URLs
    pub app_url_prefix: Option<String>,
    /// Serve over TLS (requires `paths.ssl_cert` and `paths.ssl_key`)
    #[serde(default)]
    pub ssl: bool,
    /// Enables HTTP basic auth in front of the app
    pub auth_basic_password: Option<String>,
    /// Extra host port redirected to HTTPS
    pub redirect_http_from: Option<u16>,
    /// Load wheels from the network instead of serving them locally
    #[serde(default)]
    pub use_remote_wheels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IseConfig {
    #[serde(default = "default_host")]
    pub mca_host: String,
    #[serde(default = "default_ise_port")]
    pub mca_port: u16,
    #[serde(default = "default_host")]
    pub oca_host: String,
    #[serde(default = "default_ise_port")]
    pub oca_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Host port; when unset the container port is not published
    pub port: Option<u16>,
    #[serde(default = "default_redis_image_tag")]
    pub image_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisGraphConfig {
    #[serde(default = "default_host")]
    pub mca_host: String,
    #[serde(default = "default_redisgraph_mca_port")]
    pub mca_port: u16,
    #[serde(default = "default_host")]
    pub oca_host: String,
    #[serde(default = "default_redisgraph_oca_port")]
    pub oca_port: u16,
    #[serde(default = "default_redisgraph_image_tag")]
    pub image_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisInsightConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_redisinsight_port")]
    pub port: u16,
    #[serde(default = "default_redisinsight_image_tag")]
    pub image_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    #[serde(default = "default_host")]
    pub browse_host: String,
    #[serde(default = "default_neo4j_browse_port")]
    pub browse_port: u16,
    #[serde(default = "default_host")]
    pub bolt_host: String,
    #[serde(default = "default_neo4j_bolt_port")]
    pub bolt_port: u16,
    #[serde(default = "default_neo4j_image_tag")]
    pub image_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TinkerGraphConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_tinkergraph_port")]
    pub port: u16,
    /// Tag of the `tinkerpop/gremlin-server` image
    #[serde(default = "default_gremlin_image_tag")]
    pub image_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JanusGraphConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_janusgraph_port")]
    pub port: u16,
    #[serde(default = "default_janusgraph_image_tag")]
    pub image_tag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeptuneConfig {
    /// Cluster-specific part of the Neptune endpoint host name
    pub uri_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NginxConfig {
    #[serde(default = "default_nginx_image_tag")]
    pub image_tag: String,
}

/// Versions of the supporting software served alongside the ISE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareVersions {
    #[serde(default = "default_ise_version")]
    pub ise: String,
    #[serde(default = "default_elkjs_version")]
    pub elkjs: String,
    #[serde(default = "default_mathjax_version")]
    pub mathjax: String,
    #[serde(default = "default_pyodide_version")]
    pub pyodide: String,
    #[serde(default = "default_pdfjs_version")]
    pub pdfjs: String,
    #[serde(default = "default_examp_version")]
    pub examp: String,
}

/// Path-valued settings that go through [`resolve_fs_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsPathVar {
    LibRoot,
    BuildRoot,
    GraphdbRoot,
    EmailTemplateDir,
    TwinRootDir,
    MaintenanceSiteDir,
    SslCert,
    SslKey,
}

impl FsPathVar {
    /// Dotted conf.toml key.
    pub fn key(self) -> &'static str {
        match self {
            Self::LibRoot => "paths.lib_root",
            Self::BuildRoot => "paths.build_root",
            Self::GraphdbRoot => "paths.graphdb_root",
            Self::EmailTemplateDir => "paths.email_template_dir",
            Self::TwinRootDir => "paths.twin_root_dir",
            Self::MaintenanceSiteDir => "paths.maintenance_site_dir",
            Self::SslCert => "paths.ssl_cert",
            Self::SslKey => "paths.ssl_key",
        }
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            cmd: default_docker_cmd(),
        }
    }
}

impl Default for IseConfig {
    fn default() -> Self {
        Self {
            mca_host: default_host(),
            mca_port: default_ise_port(),
            oca_host: default_host(),
            oca_port: default_ise_port(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            image_tag: default_redis_image_tag(),
        }
    }
}

impl Default for RedisGraphConfig {
    fn default() -> Self {
        Self {
            mca_host: default_host(),
            mca_port: default_redisgraph_mca_port(),
            oca_host: default_host(),
            oca_port: default_redisgraph_oca_port(),
            image_tag: default_redisgraph_image_tag(),
        }
    }
}

impl Default for RedisInsightConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_redisinsight_port(),
            image_tag: default_redisinsight_image_tag(),
        }
    }
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            browse_host: default_host(),
            browse_port: default_neo4j_browse_port(),
            bolt_host: default_host(),
            bolt_port: default_neo4j_bolt_port(),
            image_tag: default_neo4j_image_tag(),
        }
    }
}

impl Default for TinkerGraphConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_tinkergraph_port(),
            image_tag: default_gremlin_image_tag(),
        }
    }
}

impl Default for JanusGraphConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_janusgraph_port(),
            image_tag: default_janusgraph_image_tag(),
        }
    }
}

impl Default for NginxConfig {
    fn default() -> Self {
        Self {
            image_tag: default_nginx_image_tag(),
        }
    }
}

impl Default for SoftwareVersions {
    fn default() -> Self {
        Self {
            ise: default_ise_version(),
            elkjs: default_elkjs_version(),
            mathjax: default_mathjax_version(),
            pyodide: default_pyodide_version(),
            pdfjs: default_pdfjs_version(),
            examp: default_examp_version(),
        }
    }
}

impl Settings {
    /// Load from conf.toml in `manage_root`, or use defaults if not found.
    ///
    /// `pfsc_root` is taken from `[paths].pfsc_root` (relative values are
    /// resolved against `manage_root`) and otherwise defaults to the parent
    /// of `manage_root`.
    pub fn load(manage_root: &Path) -> crate::Result<Self> {
        let manage_root = std::path::absolute(manage_root).map_err(|e| {
            crate::Error::RootResolve {
                path: manage_root.to_path_buf(),
                source: e,
            }
        })?;

        let config_path = manage_root.join(CONFIG_FILE_NAME);
        let mut settings: Self = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path.clone(),
                source: e,
            })?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file; using defaults");
            Self::default()
        };

        // An absolute pfsc_root replaces manage_root in the join.
        let pfsc_root = match (settings.paths.pfsc_root.as_deref(), manage_root.parent()) {
            (Some(raw), _) if !raw.is_empty() => manage_root.join(raw),
            (_, Some(parent)) => parent.to_path_buf(),
            (_, None) => manage_root.clone(),
        };

        tracing::debug!(
            manage_root = %manage_root.display(),
            pfsc_root = %pfsc_root.display(),
            "settings loaded"
        );

        settings.manage_root = manage_root;
        settings.pfsc_root = pfsc_root;
        Ok(settings)
    }

    /// Settings with all defaults, rooted at the given directories.
    pub fn with_roots(manage_root: impl Into<PathBuf>, pfsc_root: impl Into<PathBuf>) -> Self {
        Self {
            manage_root: manage_root.into(),
            pfsc_root: pfsc_root.into(),
            ..Self::default()
        }
    }

    /// Raw, unresolved value of a path-valued setting.
    pub fn raw_fs_path(&self, var: FsPathVar) -> Option<&str> {
        let paths = &self.paths;
        match var {
            FsPathVar::LibRoot => paths.lib_root.as_deref(),
            FsPathVar::BuildRoot => paths.build_root.as_deref(),
            FsPathVar::GraphdbRoot => paths.graphdb_root.as_deref(),
            FsPathVar::EmailTemplateDir => paths.email_template_dir.as_deref(),
            FsPathVar::TwinRootDir => paths.twin_root_dir.as_deref(),
            FsPathVar::MaintenanceSiteDir => paths.maintenance_site_dir.as_deref(),
            FsPathVar::SslCert => paths.ssl_cert.as_deref(),
            FsPathVar::SslKey => paths.ssl_key.as_deref(),
        }
    }

    /// Resolve a path-valued setting against `pfsc_root`.
    pub fn resolve_fs_path(&self, var: FsPathVar) -> Option<PathBuf> {
        resolve_fs_path(self.raw_fs_path(var), &self.pfsc_root)
    }

    /// Resolved value of a setting that is set to something non-empty.
    ///
    /// Unlike [`Settings::resolve_fs_path`], an empty string counts as unset.
    pub fn configured_fs_path(&self, var: FsPathVar) -> Option<PathBuf> {
        match self.raw_fs_path(var) {
            Some(raw) if !raw.is_empty() => resolve_fs_path(Some(raw), &self.pfsc_root),
            _ => None,
        }
    }

    /// [`Settings::configured_fs_path`] for a setting that must be present.
    pub fn required_fs_path(
        &self,
        var: FsPathVar,
        needed_for: &'static str,
    ) -> crate::Result<PathBuf> {
        match self.configured_fs_path(var) {
            Some(path) => Ok(path),
            None => Err(crate::Error::MissingSetting {
                key: var.key(),
                needed_for,
            }),
        }
    }

    /// Configured Neptune URI prefix, if non-empty.
    pub fn neptune_uri_prefix(&self) -> Option<&str> {
        match self.neptune.uri_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => Some(prefix),
            _ => None,
        }
    }

    /// `(root_url, app_url_prefix)` for the configured URL prefix.
    pub fn app_url_prefix(&self) -> (String, String) {
        check_app_url_prefix(self.web.app_url_prefix.as_deref())
    }

    /// `{pfsc_root}/src`
    pub fn src_root(&self) -> PathBuf {
        crate::paths::src_root(&self.pfsc_root)
    }
}

fn default_docker_cmd() -> String {
    "docker".to_owned()
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_ise_port() -> u16 {
    7372
}

fn default_redis_image_tag() -> String {
    "6.2.1".to_owned()
}

fn default_redisgraph_mca_port() -> u16 {
    6381
}

fn default_redisgraph_oca_port() -> u16 {
    6379
}

fn default_redisgraph_image_tag() -> String {
    "2.4.13".to_owned()
}

fn default_redisinsight_port() -> u16 {
    8001
}

fn default_redisinsight_image_tag() -> String {
    "1.11.0".to_owned()
}

fn default_neo4j_browse_port() -> u16 {
    7474
}

fn default_neo4j_bolt_port() -> u16 {
    7687
}

fn default_neo4j_image_tag() -> String {
    "4.0.6".to_owned()
}

fn default_tinkergraph_port() -> u16 {
    8182
}

fn default_gremlin_image_tag() -> String {
    "3.5.2".to_owned()
}

fn default_janusgraph_port() -> u16 {
    8183
}

fn default_janusgraph_image_tag() -> String {
    "0.6.1".to_owned()
}

fn default_nginx_image_tag() -> String {
    "1.19.10".to_owned()
}

fn default_ise_version() -> String {
    "0.24.0".to_owned()
}

fn default_elkjs_version() -> String {
    "0.8.2".to_owned()
}

fn default_mathjax_version() -> String {
    "3.0.1".to_owned()
}

fn default_pyodide_version() -> String {
    "0.20.0".to_owned()
}

fn default_pdfjs_version() -> String {
    "2.13.216".to_owned()
}

fn default_examp_version() -> String {
    "0.22.10".to_owned()
}
