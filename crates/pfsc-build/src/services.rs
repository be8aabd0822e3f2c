//! docker-compose service definitions for each backing service.
//!
//! Builders are pure: they read [`Settings`] and their parameters and return
//! a fresh [`ServiceDefinition`]. List order only matters for readability of
//! the emitted compose file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pfsc_core::{FsPathVar, Settings};
use serde::Serialize;

use crate::gdb::GdbCode;

/// Python minor version of the pfsc-server images and venv.
pub const PYTHON_VERSION: &str = "3.8";

/// Home of the pfsc user inside the application images.
const PFSC_HOME: &str = "/home/pfsc/proofscape/src";

/// One service entry of a compose document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
    pub image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

impl ServiceDefinition {
    fn image(image: String) -> Self {
        Self {
            image,
            ..Self::default()
        }
    }
}

/// Host directory for one of the standard installation subdirectories
/// (`lib`, `build`, `graphdb`, `PDFLibrary`, ...).
///
/// `lib`, `build` and `graphdb` honour their configured roots when those
/// are set to something non-empty.
pub fn subdir_on_host(settings: &Settings, subdir: &str) -> PathBuf {
    let configured = match subdir {
        "lib" => settings.configured_fs_path(FsPathVar::LibRoot),
        "build" => settings.configured_fs_path(FsPathVar::BuildRoot),
        "graphdb" => settings.configured_fs_path(FsPathVar::GraphdbRoot),
        _ => None,
    };
    match configured {
        Some(path) => path,
        None => settings.pfsc_root.join(subdir),
    }
}

fn root(settings: &Settings) -> String {
    settings.pfsc_root.display().to_string()
}

// ── Backing services ──

pub fn redis(host: &str, port: Option<u16>, tag: &str) -> ServiceDefinition {
    let mut d = ServiceDefinition::image(format!("redis:{tag}"));
    if let Some(port) = port {
        d.ports.push(format!("{host}:{port}:6379"));
    }
    d
}

/// Redis with defaults from settings.
pub fn default_redis(settings: &Settings) -> ServiceDefinition {
    let cfg = &settings.redis;
    redis(&cfg.host, cfg.port, &cfg.image_tag)
}

pub fn redisgraph(settings: &Settings, tag: &str) -> ServiceDefinition {
    let graphdb = subdir_on_host(settings, "graphdb");
    let cfg = &settings.redisgraph;
    ServiceDefinition {
        volumes: vec![format!("{}/{}:/data", graphdb.display(), GdbCode::Re)],
        ports: vec![format!("{}:{}:6379", cfg.mca_host, cfg.mca_port)],
        ..ServiceDefinition::image(format!("redislabs/redisgraph:{tag}"))
    }
}

pub fn redisinsight(settings: &Settings, tag: &str) -> ServiceDefinition {
    let cfg = &settings.redisinsight;
    ServiceDefinition {
        ports: vec![format!("{}:{}:8001", cfg.host, cfg.port)],
        ..ServiceDefinition::image(format!("redislabs/redisinsight:{tag}"))
    }
}

/// Neo4j; `ports` is `(browse, bolt)`, and `None` publishes nothing.
///
/// Each port binds to its own host from `hosts`, so the bolt port follows
/// `bolt_host` rather than `browse_host`.
pub fn neo4j(
    settings: &Settings,
    hosts: (&str, &str),
    ports: Option<(u16, u16)>,
    tag: &str,
) -> ServiceDefinition {
    let graphdb = subdir_on_host(settings, "graphdb");
    let mut d = ServiceDefinition {
        volumes: vec![
            format!("{}/{}/data:/data", graphdb.display(), GdbCode::Nj),
            format!("{}/{}/logs:/logs", graphdb.display(), GdbCode::Nj),
        ],
        environment: BTreeMap::from([("NEO4J_AUTH".to_owned(), "none".to_owned())]),
        ..ServiceDefinition::image(format!("neo4j:{tag}"))
    };
    if let Some((browse, bolt)) = ports {
        d.ports = vec![
            format!("{}:{browse}:7474", hosts.0),
            format!("{}:{bolt}:7687", hosts.1),
        ];
    }
    d
}

/// Neo4j with hosts, ports and tag from settings.
pub fn default_neo4j(settings: &Settings) -> ServiceDefinition {
    let cfg = &settings.neo4j;
    neo4j(
        settings,
        (&cfg.browse_host, &cfg.bolt_host),
        Some((cfg.browse_port, cfg.bolt_port)),
        &cfg.image_tag,
    )
}

pub fn tinkergraph(settings: &Settings, tag: &str) -> ServiceDefinition {
    let cfg = &settings.tinkergraph;
    ServiceDefinition {
        ports: vec![format!("{}:{}:8182", cfg.host, cfg.port)],
        ..ServiceDefinition::image(format!("tinkerpop/gremlin-server:{tag}"))
    }
}

pub fn janusgraph(settings: &Settings, tag: &str) -> ServiceDefinition {
    let cfg = &settings.janusgraph;
    ServiceDefinition {
        ports: vec![format!("{}:{}:8182", cfg.host, cfg.port)],
        ..ServiceDefinition::image(format!("janusgraph/janusgraph:{tag}"))
    }
}

// ── Application servers ──

pub fn pfsc_dummy_server(flask_config: &str, tag: &str) -> ServiceDefinition {
    ServiceDefinition {
        environment: BTreeMap::from([("FLASK_CONFIG".to_owned(), flask_config.to_owned())]),
        ..ServiceDefinition::image(format!("pfsc-dummy-server:{tag}"))
    }
}

/// Role of a pfsc-server container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerMode {
    #[default]
    Websrv,
    Worker,
    Math,
}

impl ServerMode {
    fn command(self) -> Vec<String> {
        let parts: &[&str] = match self {
            Self::Websrv => &["websrv"],
            Self::Worker => &["worker"],
            Self::Math => &["worker", "math"],
        };
        parts.iter().map(|s| (*s).to_owned()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ServerParams {
    pub deploy_dir: PathBuf,
    pub mode: ServerMode,
    pub flask_config: String,
    pub tag: String,
    /// Graph databases in use; empty means RedisGraph only.
    pub gdb: Vec<GdbCode>,
    pub workers: u32,
    pub demos: bool,
    /// Mount server sources read-only for development.
    pub mount_code: bool,
    /// Comma-separated site-packages to mount from the local venv.
    pub mount_pkg: Option<String>,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self {
            deploy_dir: PathBuf::new(),
            mode: ServerMode::default(),
            flask_config: "production".to_owned(),
            tag: "latest".to_owned(),
            gdb: vec![GdbCode::Re],
            workers: 1,
            demos: false,
            mount_code: false,
            mount_pkg: None,
        }
    }
}

pub fn pfsc_server(settings: &Settings, params: &ServerParams) -> ServiceDefinition {
    let root = root(settings);
    let mut volumes: Vec<String> = ["lib", "build", "PDFLibrary"]
        .iter()
        .map(|dir| format!("{}:/proofscape/{dir}", subdir_on_host(settings, dir).display()))
        .collect();
    volumes.push(format!(
        "{}/docker.env:{PFSC_HOME}/pfsc-server/instance/.env:ro",
        params.deploy_dir.display()
    ));

    let mut d = ServiceDefinition {
        depends_on: vec!["redis".to_owned()],
        volumes,
        environment: BTreeMap::from([(
            "FLASK_CONFIG".to_owned(),
            params.flask_config.clone(),
        )]),
        command: params.mode.command(),
        ..ServiceDefinition::image(format!("pfsc-server:{}", params.tag))
    };

    let gdb: &[GdbCode] = if params.gdb.is_empty() {
        &[GdbCode::Re]
    } else {
        &params.gdb
    };
    if params.mode == ServerMode::Websrv {
        d.depends_on.extend(
            gdb.iter()
                .filter(|code| code.via_container())
                .map(|code| code.service_name().to_owned()),
        );
        d.depends_on
            .extend((0..params.workers).map(|n| format!("pfscwork{n}")));
    }
    if params.demos {
        d.volumes
            .push(format!("{root}/src/pfsc-demo-repos:/home/pfsc/demos:ro"));
    }
    if let Some(dir) = settings.configured_fs_path(FsPathVar::EmailTemplateDir) {
        d.volumes.push(format!(
            "{}:{PFSC_HOME}/_email_templates:ro",
            dir.display()
        ));
    }
    if params.mount_code {
        for item in ["pfsc", "config.py", "pfsc.ini"] {
            d.volumes.push(format!(
                "{root}/src/pfsc-server/{item}:{PFSC_HOME}/pfsc-server/{item}:ro"
            ));
        }
    }
    d.volumes
        .extend(package_mounts(&root, params.mount_pkg.as_deref()));
    d
}

#[derive(Debug, Clone)]
pub struct OcaParams {
    pub tag: String,
    pub mount_code: bool,
    pub mount_pkg: Option<String>,
}

impl Default for OcaParams {
    fn default() -> Self {
        Self {
            tag: "latest".to_owned(),
            mount_code: false,
            mount_pkg: None,
        }
    }
}

pub fn proofscape_oca(settings: &Settings, params: &OcaParams) -> ServiceDefinition {
    let root = root(settings);
    let rg = &settings.redisgraph;
    let ise = &settings.ise;
    let mut d = ServiceDefinition {
        ports: vec![
            format!("{}:{}:6379", rg.oca_host, rg.oca_port),
            format!("{}:{}:7372", ise.oca_host, ise.oca_port),
        ],
        volumes: ["lib", "build", "graphdb", "deploy", "PDFLibrary"]
            .iter()
            .map(|dir| format!("{}:/proofscape/{dir}", subdir_on_host(settings, dir).display()))
            .collect(),
        ..ServiceDefinition::image(format!("pise:{}", params.tag))
    };

    if params.mount_code {
        let server = format!("{root}/src/pfsc-server");
        let static_dir = format!("{PFSC_HOME}/pfsc-server/static");
        d.volumes.extend([
            format!("{server}/pfsc:{PFSC_HOME}/pfsc-server/pfsc:ro"),
            format!("{server}/static/css:{static_dir}/css:ro"),
            format!("{server}/static/img:{static_dir}/img:ro"),
            format!("{server}/config.py:{PFSC_HOME}/pfsc-server/config.py:ro"),
            format!("{server}/web.py:{PFSC_HOME}/pfsc-server/web.py:ro"),
            format!(
                "{root}/src/pfsc-ise/dist/ise.bundle.js:{static_dir}/ise/v{}/ise.bundle.js:ro",
                settings.versions.ise
            ),
            format!("{root}/src/pfsc-pdf/build/generic:{static_dir}/pdfjs:ro"),
            format!("{root}/src/whl:{static_dir}/whl:ro"),
        ]);
    }
    d.volumes
        .extend(package_mounts(&root, params.mount_pkg.as_deref()));
    d
}

/// Volumes mounting single site-packages from the local venv over the image's.
fn package_mounts(root: &str, mount_pkg: Option<&str>) -> Vec<String> {
    let Some(list) = mount_pkg else {
        return Vec::new();
    };
    list.split(',')
        .map(str::trim)
        .filter(|pkg| !pkg.is_empty())
        .map(|pkg| {
            format!(
                "{root}/src/pfsc-server/venv/lib/python{PYTHON_VERSION}/site-packages/{pkg}:\
                 /usr/local/lib/python{PYTHON_VERSION}/site-packages/{pkg}"
            )
        })
        .collect()
}

// ── Reverse proxy ──

#[derive(Debug, Clone)]
pub struct NginxParams {
    pub deploy_dir: PathBuf,
    pub tag: String,
    pub host: String,
    pub port: u16,
    /// Front a dummy server: no static asset mounts.
    pub dummy: bool,
}

impl NginxParams {
    /// Parameters with tag, host and port taken from settings.
    pub fn new(settings: &Settings, deploy_dir: &Path) -> Self {
        Self {
            deploy_dir: deploy_dir.to_path_buf(),
            tag: settings.nginx.image_tag.clone(),
            host: settings.ise.mca_host.clone(),
            port: settings.ise.mca_port,
            dummy: false,
        }
    }
}

fn listen_port(settings: &Settings) -> u16 {
    if settings.web.ssl { 443 } else { 80 }
}

/// Redirect port, TLS material and basic-auth file, shared by both proxies.
///
/// With `web.ssl` on, both `paths.ssl_cert` and `paths.ssl_key` must be set.
fn proxy_extras(
    settings: &Settings,
    d: &mut ServiceDefinition,
    host: &str,
    deploy_dir: &Path,
) -> pfsc_core::Result<()> {
    if let Some(from) = settings.web.redirect_http_from {
        d.ports.push(format!("{host}:{from}:80"));
    }
    if settings.web.ssl {
        let cert = settings.required_fs_path(FsPathVar::SslCert, SSL_ENABLED)?;
        let key = settings.required_fs_path(FsPathVar::SslKey, SSL_ENABLED)?;
        d.volumes
            .push(format!("{}:/etc/nginx/ssl/cert", cert.display()));
        d.volumes.push(format!("{}:/etc/nginx/ssl/key", key.display()));
    }
    if settings.web.auth_basic_password.is_some() {
        d.volumes
            .push(format!("{}/htpasswd:/etc/nginx/.htpasswd", deploy_dir.display()));
    }
    Ok(())
}

const SSL_ENABLED: &str = "web.ssl is enabled";

pub fn nginx(settings: &Settings, params: &NginxParams) -> pfsc_core::Result<ServiceDefinition> {
    let root = root(settings);
    let v = &settings.versions;
    let mut d = ServiceDefinition {
        depends_on: vec!["pfscweb".to_owned()],
        ports: vec![format!(
            "{}:{}:{}",
            params.host,
            params.port,
            listen_port(settings)
        )],
        volumes: vec![format!(
            "{}/nginx.conf:/etc/nginx/conf.d/default.conf:ro",
            params.deploy_dir.display()
        )],
        ..ServiceDefinition::image(format!("nginx:{}", params.tag))
    };

    if !params.dummy {
        if let Some(twin) = settings.configured_fs_path(FsPathVar::TwinRootDir) {
            d.volumes
                .push(format!("{}:/usr/share/nginx/twin-site:ro", twin.display()));
        }
        let share = "/usr/share/nginx";
        d.volumes.extend([
            format!("{root}/PDFLibrary:{share}/PDFLibrary:ro"),
            format!("{root}/src/pfsc-pdf/build/generic:{share}/pdfjs/v{}:ro", v.pdfjs),
            format!("{root}/src/pfsc-ise/dist/ise:{share}/ise/v{}:ro", v.ise),
            format!("{root}/src/pfsc-ise/dist/dojo:{share}/dojo:ro"),
            format!("{root}/src/pfsc-ise/dist/mathjax:{share}/mathjax/v{}:ro", v.mathjax),
            format!("{root}/src/pfsc-ise/dist/elk:{share}/elk/v{}:ro", v.elkjs),
            format!("{root}/src/pfsc-server/static/css:{share}/css:ro"),
            format!("{root}/src/pfsc-server/static/img:{share}/img:ro"),
            format!(
                "{root}/src/pyodide/v{pyodide}:{share}/pyodide/v{pyodide}:ro",
                pyodide = v.pyodide
            ),
        ]);
        if !settings.web.use_remote_wheels {
            d.volumes.push(format!("{root}/src/whl:{share}/whl:ro"));
        }
    }
    proxy_extras(settings, &mut d, &params.host, &params.deploy_dir)?;
    Ok(d)
}

/// Maintenance-page proxy; the site defaults to `{pfsc_root}/maintenance`.
pub fn maintenance_nginx(
    settings: &Settings,
    params: &NginxParams,
) -> pfsc_core::Result<ServiceDefinition> {
    let site = match settings.configured_fs_path(FsPathVar::MaintenanceSiteDir) {
        Some(dir) => dir,
        None => settings.pfsc_root.join("maintenance"),
    };
    let mut d = ServiceDefinition {
        ports: vec![format!(
            "{}:{}:{}",
            params.host,
            params.port,
            listen_port(settings)
        )],
        volumes: vec![
            format!(
                "{}/maintenance_nginx.conf:/etc/nginx/conf.d/default.conf:ro",
                params.deploy_dir.display()
            ),
            format!("{}:/usr/share/nginx/html/maintenance:ro", site.display()),
        ],
        ..ServiceDefinition::image(format!("nginx:{}", params.tag))
    };
    proxy_extras(settings, &mut d, &params.host, &params.deploy_dir)?;
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::with_roots("/opt/pfsc/pfsc-manage", "/opt/pfsc")
    }

    #[test]
    fn redis_without_port_publishes_nothing() {
        let d = redis("127.0.0.1", None, "6.2.1");
        assert_eq!(d.image, "redis:6.2.1");
        assert!(d.ports.is_empty());
    }

    #[test]
    fn redis_with_port() {
        let d = redis("0.0.0.0", Some(6380), "7");
        assert_eq!(d.ports, vec!["0.0.0.0:6380:6379"]);
    }

    #[test]
    fn subdir_honours_configured_roots() {
        let mut s = settings();
        s.paths.lib_root = Some("/mnt/lib".to_owned());
        assert_eq!(subdir_on_host(&s, "lib"), PathBuf::from("/mnt/lib"));
        assert_eq!(subdir_on_host(&s, "build"), PathBuf::from("/opt/pfsc/build"));
        assert_eq!(
            subdir_on_host(&s, "PDFLibrary"),
            PathBuf::from("/opt/pfsc/PDFLibrary")
        );
    }

    #[test]
    fn empty_root_settings_fall_back_to_install_subdirs() {
        let mut s = settings();
        s.paths.lib_root = Some(String::new());
        s.paths.graphdb_root = Some(String::new());
        assert_eq!(subdir_on_host(&s, "lib"), PathBuf::from("/opt/pfsc/lib"));
        assert_eq!(subdir_on_host(&s, "graphdb"), PathBuf::from("/opt/pfsc/graphdb"));
    }

    #[test]
    fn redisgraph_mounts_graphdb_subdir() {
        let d = redisgraph(&settings(), "2.4.13");
        assert_eq!(d.image, "redislabs/redisgraph:2.4.13");
        assert_eq!(d.volumes, vec!["/opt/pfsc/graphdb/re:/data"]);
        assert_eq!(d.ports, vec!["127.0.0.1:6381:6379"]);
    }

    #[test]
    fn neo4j_ports_optional() {
        let s = settings();
        let d = neo4j(&s, ("127.0.0.1", "127.0.0.1"), None, "4.0.6");
        assert!(d.ports.is_empty());
        assert_eq!(d.environment.get("NEO4J_AUTH").map(String::as_str), Some("none"));

        let d = default_neo4j(&s);
        assert_eq!(d.ports, vec!["127.0.0.1:7474:7474", "127.0.0.1:7687:7687"]);
        assert_eq!(
            d.volumes,
            vec![
                "/opt/pfsc/graphdb/nj/data:/data",
                "/opt/pfsc/graphdb/nj/logs:/logs"
            ]
        );
    }

    #[test]
    fn websrv_depends_on_container_gdbs_and_workers() {
        let params = ServerParams {
            gdb: vec![GdbCode::Re, GdbCode::Np, GdbCode::Nj],
            workers: 2,
            ..Default::default()
        };
        let d = pfsc_server(&settings(), &params);
        assert_eq!(
            d.depends_on,
            vec!["redis", "redisgraph", "neo4j", "pfscwork0", "pfscwork1"]
        );
        assert_eq!(d.command, vec!["websrv"]);
    }

    #[test]
    fn worker_depends_only_on_redis() {
        let params = ServerParams {
            mode: ServerMode::Math,
            workers: 3,
            ..Default::default()
        };
        let d = pfsc_server(&settings(), &params);
        assert_eq!(d.depends_on, vec!["redis"]);
        assert_eq!(d.command, vec!["worker", "math"]);
    }

    #[test]
    fn empty_gdb_list_means_redisgraph() {
        let params = ServerParams {
            gdb: vec![],
            workers: 0,
            ..Default::default()
        };
        let d = pfsc_server(&settings(), &params);
        assert_eq!(d.depends_on, vec!["redis", "redisgraph"]);
    }

    #[test]
    fn server_optional_mounts() {
        let mut s = settings();
        s.paths.email_template_dir = Some("email".to_owned());
        let params = ServerParams {
            deploy_dir: PathBuf::from("/opt/pfsc/deploy/production"),
            demos: true,
            mount_code: true,
            mount_pkg: Some("pfsc_util, typeguard".to_owned()),
            ..Default::default()
        };
        let d = pfsc_server(&s, &params);
        assert_eq!(d.volumes[0], "/opt/pfsc/lib:/proofscape/lib");
        assert!(d.volumes.contains(
            &"/opt/pfsc/deploy/production/docker.env:/home/pfsc/proofscape/src/pfsc-server/instance/.env:ro"
                .to_owned()
        ));
        assert!(d.volumes.contains(
            &"/opt/pfsc/src/pfsc-demo-repos:/home/pfsc/demos:ro".to_owned()
        ));
        assert!(d.volumes.contains(
            &"/opt/pfsc/email:/home/pfsc/proofscape/src/_email_templates:ro".to_owned()
        ));
        assert!(d.volumes.iter().any(|v| v.ends_with("pfsc-server/config.py:ro")));
        assert!(d.volumes.contains(
            &"/opt/pfsc/src/pfsc-server/venv/lib/python3.8/site-packages/typeguard:/usr/local/lib/python3.8/site-packages/typeguard"
                .to_owned()
        ));
        assert_eq!(d.volumes.len(), 3 + 1 + 1 + 1 + 3 + 2);
    }

    #[test]
    fn empty_email_template_dir_is_not_mounted() {
        let mut s = settings();
        s.paths.lib_root = Some(String::new());
        s.paths.email_template_dir = Some(String::new());
        let d = pfsc_server(&s, &ServerParams::default());
        assert_eq!(d.volumes[0], "/opt/pfsc/lib:/proofscape/lib");
        assert!(!d.volumes.iter().any(|v| v.contains("_email_templates")));
        assert!(!d.volumes.iter().any(|v| v.starts_with("/opt/pfsc:")));
    }

    #[test]
    fn oca_ports_and_volumes() {
        let d = proofscape_oca(&settings(), &OcaParams::default());
        assert_eq!(d.image, "pise:latest");
        assert_eq!(d.ports, vec!["127.0.0.1:6379:6379", "127.0.0.1:7372:7372"]);
        assert_eq!(d.volumes.len(), 5);
        assert_eq!(d.volumes[3], "/opt/pfsc/deploy:/proofscape/deploy");
    }

    #[test]
    fn oca_mount_code_uses_ise_version() {
        let params = OcaParams {
            mount_code: true,
            ..Default::default()
        };
        let d = proofscape_oca(&settings(), &params);
        assert!(d.volumes.iter().any(|v| v.contains("/static/ise/v0.24.0/ise.bundle.js:ro")));
    }

    #[test]
    fn nginx_plain_http() {
        let s = settings();
        let params = NginxParams::new(&s, Path::new("/opt/pfsc/deploy/production"));
        let d = nginx(&s, &params).unwrap();
        assert_eq!(d.ports, vec!["127.0.0.1:7372:80"]);
        assert_eq!(d.depends_on, vec!["pfscweb"]);
        assert!(d.volumes.contains(&"/opt/pfsc/src/whl:/usr/share/nginx/whl:ro".to_owned()));
        assert!(d.volumes.contains(
            &"/opt/pfsc/src/pyodide/v0.20.0:/usr/share/nginx/pyodide/v0.20.0:ro".to_owned()
        ));
        assert!(!d.volumes.iter().any(|v| v.contains("ssl")));
    }

    #[test]
    fn nginx_ssl_auth_and_redirect() {
        let mut s = settings();
        s.web.ssl = true;
        s.web.redirect_http_from = Some(80);
        s.web.auth_basic_password = Some("secret".to_owned());
        s.web.use_remote_wheels = true;
        s.paths.ssl_cert = Some("/etc/letsencrypt/live/fullchain.pem".to_owned());
        s.paths.ssl_key = Some("ssl/key.pem".to_owned());
        let params = NginxParams::new(&s, Path::new("/d"));
        let d = nginx(&s, &params).unwrap();

        assert_eq!(d.ports, vec!["127.0.0.1:7372:443", "127.0.0.1:80:80"]);
        assert!(d.volumes.contains(
            &"/etc/letsencrypt/live/fullchain.pem:/etc/nginx/ssl/cert".to_owned()
        ));
        assert!(d.volumes.contains(&"/opt/pfsc/ssl/key.pem:/etc/nginx/ssl/key".to_owned()));
        assert!(d.volumes.contains(&"/d/htpasswd:/etc/nginx/.htpasswd".to_owned()));
        assert!(!d.volumes.iter().any(|v| v.contains("/whl")));
    }

    #[test]
    fn nginx_ssl_without_cert_is_a_config_error() {
        let mut s = settings();
        s.web.ssl = true;
        s.paths.ssl_key = Some("ssl/key.pem".to_owned());
        let params = NginxParams::new(&s, Path::new("/d"));

        let err = nginx(&s, &params).unwrap_err();
        assert!(matches!(
            err,
            pfsc_core::Error::MissingSetting { key: "paths.ssl_cert", .. }
        ));

        s.paths.ssl_cert = Some("ssl/cert.pem".to_owned());
        s.paths.ssl_key = None;
        let err = maintenance_nginx(&s, &params).unwrap_err();
        assert!(err.to_string().contains("paths.ssl_key"));
    }

    #[test]
    fn nginx_empty_twin_dir_is_not_mounted() {
        let mut s = settings();
        s.paths.twin_root_dir = Some(String::new());
        let d = nginx(&s, &NginxParams::new(&s, Path::new("/d"))).unwrap();
        assert!(!d.volumes.iter().any(|v| v.contains("twin-site")));
    }

    #[test]
    fn dummy_nginx_skips_static_assets() {
        let s = settings();
        let params = NginxParams {
            dummy: true,
            ..NginxParams::new(&s, Path::new("/d"))
        };
        let d = nginx(&s, &params).unwrap();
        assert_eq!(d.volumes, vec!["/d/nginx.conf:/etc/nginx/conf.d/default.conf:ro"]);
    }

    #[test]
    fn maintenance_nginx_serves_site_dir() {
        let mut s = settings();
        s.paths.maintenance_site_dir = Some("maint".to_owned());
        let d = maintenance_nginx(&s, &NginxParams::new(&s, Path::new("/d"))).unwrap();
        assert!(d.depends_on.is_empty());
        assert_eq!(
            d.volumes[1],
            "/opt/pfsc/maint:/usr/share/nginx/html/maintenance:ro"
        );
    }

    #[test]
    fn serialization_omits_empty_fields() {
        let d = tinkergraph(&settings(), "3.5.2");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "image": "tinkerpop/gremlin-server:3.5.2",
                "ports": ["127.0.0.1:8182:8182"],
            })
        );
    }
}
