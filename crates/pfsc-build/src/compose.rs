//! docker-compose deployments assembled from the service builders.

use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::conf::DockerEnv;
use crate::gdb::GdbCode;
use crate::services::{
    self, NginxParams, OcaParams, ServerMode, ServerParams, ServiceDefinition,
};
use crate::templates::{Renderer, TemplateError};

const COMPOSE_VERSION: &str = "3.5";

pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";
pub const NGINX_CONF_FILE_NAME: &str = "nginx.conf";
pub const DOCKER_ENV_FILE_NAME: &str = "docker.env";

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to serialize docker-compose document")]
    Yaml { source: serde_yaml::Error },

    #[error(transparent)]
    Core(#[from] pfsc_core::Error),

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A compose document; services keep their insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeFile {
    pub version: String,
    #[serde(serialize_with = "ordered_services")]
    pub services: Vec<(String, ServiceDefinition)>,
}

fn ordered_services<S: Serializer>(
    services: &[(String, ServiceDefinition)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(services.len()))?;
    for (name, defn) in services {
        map.serialize_entry(name, defn)?;
    }
    map.end()
}

impl ComposeFile {
    fn new() -> Self {
        Self {
            version: COMPOSE_VERSION.to_owned(),
            services: Vec::new(),
        }
    }

    fn add(&mut self, name: impl Into<String>, defn: ServiceDefinition) {
        self.services.push((name.into(), defn));
    }

    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|(n, _)| n.as_str())
    }

    pub fn to_yaml(&self) -> Result<String, ComposeError> {
        serde_yaml::to_string(self).map_err(|e| ComposeError::Yaml { source: e })
    }
}

/// Options of `pfsc deploy generate`.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub deploy_dir: PathBuf,
    pub gdb: Vec<GdbCode>,
    pub workers: u32,
    pub demos: bool,
    pub mount_code: bool,
    pub mount_pkg: Option<String>,
    /// Front a dummy server instead of pfsc-server.
    pub dummy: bool,
    /// Single `pise` container instead of the multi-container layout.
    pub oca: bool,
    pub flask_config: String,
    pub tag: String,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            deploy_dir: PathBuf::new(),
            gdb: vec![GdbCode::Re],
            workers: 1,
            demos: false,
            mount_code: false,
            mount_pkg: None,
            dummy: false,
            oca: false,
            flask_config: "production".to_owned(),
            tag: "latest".to_owned(),
        }
    }
}

/// Generated deploy directory contents.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub compose: ComposeFile,
    /// Absent for the one-container app.
    pub nginx_conf: Option<String>,
    pub docker_env: Option<String>,
    /// Things the operator must fix by hand before starting the stack.
    pub warnings: Vec<String>,
}

impl Deployment {
    /// `(file name, contents)` of every file in the deploy directory.
    pub fn files(&self) -> Result<Vec<(&'static str, String)>, ComposeError> {
        let mut files = vec![(COMPOSE_FILE_NAME, self.compose.to_yaml()?)];
        if let Some(conf) = &self.nginx_conf {
            files.push((NGINX_CONF_FILE_NAME, conf.clone()));
        }
        if let Some(env) = &self.docker_env {
            files.push((DOCKER_ENV_FILE_NAME, env.clone()));
        }
        Ok(files)
    }

    /// Create `dir` (which must not exist yet) and write every file into it.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ComposeError> {
        let files = self.files()?;
        pfsc_core::make_dirs(dir, false)?;
        let mut written = Vec::with_capacity(files.len());
        for (name, contents) in files {
            let path = dir.join(name);
            std::fs::write(&path, contents).map_err(|e| ComposeError::Write {
                path: path.clone(),
                source: e,
            })?;
            tracing::info!(path = %path.display(), "wrote deploy file");
            written.push(path);
        }
        Ok(written)
    }
}

/// Assemble a deployment from `opts`.
pub fn generate(renderer: &Renderer<'_>, opts: &DeployOptions) -> Result<Deployment, ComposeError> {
    let settings = renderer.settings();

    if opts.oca {
        let mut compose = ComposeFile::new();
        compose.add(
            "pise",
            services::proofscape_oca(
                settings,
                &OcaParams {
                    tag: opts.tag.clone(),
                    mount_code: opts.mount_code,
                    mount_pkg: opts.mount_pkg.clone(),
                },
            ),
        );
        return Ok(Deployment {
            compose,
            nginx_conf: None,
            docker_env: None,
            warnings: Vec::new(),
        });
    }

    let gdb: &[GdbCode] = if opts.gdb.is_empty() {
        &[GdbCode::Re]
    } else {
        &opts.gdb
    };

    let mut warnings = Vec::new();
    for code in gdb {
        if code.requires_manual_uri(settings) {
            tracing::warn!(gdb = %code, "graph database URI must be configured by hand");
            warnings.push(format!(
                "{} requires a manually configured URI; edit GRAPHDB_URI in {DOCKER_ENV_FILE_NAME} \
                 or set [neptune].uri_prefix in conf.toml",
                code.service_name()
            ));
        }
    }

    let mut compose = ComposeFile::new();
    compose.add("redis", services::default_redis(settings));

    if opts.dummy {
        compose.add(
            "pfscweb",
            services::pfsc_dummy_server(&opts.flask_config, &opts.tag),
        );
    } else {
        for code in gdb {
            if let Some(defn) = code.service_definition(settings) {
                compose.add(code.service_name(), defn);
            }
        }
        let server = |mode: ServerMode| {
            services::pfsc_server(
                settings,
                &ServerParams {
                    deploy_dir: opts.deploy_dir.clone(),
                    mode,
                    flask_config: opts.flask_config.clone(),
                    tag: opts.tag.clone(),
                    gdb: gdb.to_vec(),
                    workers: opts.workers,
                    demos: opts.demos,
                    mount_code: opts.mount_code,
                    mount_pkg: opts.mount_pkg.clone(),
                },
            )
        };
        compose.add("pfscweb", server(ServerMode::Websrv));
        for n in 0..opts.workers {
            compose.add(format!("pfscwork{n}"), server(ServerMode::Worker));
        }
    }

    let nginx_params = NginxParams {
        dummy: opts.dummy,
        ..NginxParams::new(settings, &opts.deploy_dir)
    };
    compose.add("nginx", services::nginx(settings, &nginx_params)?);

    let graphdb_uri = gdb[0].docker_uri(settings);
    let docker_env = renderer.docker_env(&DockerEnv {
        flask_config: &opts.flask_config,
        graphdb_uri: &graphdb_uri,
    })?;

    Ok(Deployment {
        compose,
        nginx_conf: Some(renderer.front_nginx_conf(opts.dummy)?),
        docker_env: Some(docker_env),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfsc_core::Settings;

    fn settings() -> Settings {
        Settings::with_roots("/opt/pfsc/pfsc-manage", "/opt/pfsc")
    }

    fn opts() -> DeployOptions {
        DeployOptions {
            deploy_dir: PathBuf::from("/opt/pfsc/deploy/production_test"),
            ..Default::default()
        }
    }

    #[test]
    fn default_layout() {
        let s = settings();
        let r = Renderer::new(&s).unwrap();
        let d = generate(&r, &opts()).unwrap();
        let names: Vec<&str> = d.compose.service_names().collect();
        assert_eq!(names, vec!["redis", "redisgraph", "pfscweb", "pfscwork0", "nginx"]);
        assert!(d.warnings.is_empty());
        assert!(
            d.docker_env
                .as_deref()
                .unwrap()
                .contains("GRAPHDB_URI=redis://redisgraph:6379")
        );
    }

    #[test]
    fn includes_every_container_gdb_and_worker() {
        let s = settings();
        let r = Renderer::new(&s).unwrap();
        let o = DeployOptions {
            gdb: vec![GdbCode::Nj, GdbCode::Tk, GdbCode::Ja],
            workers: 3,
            ..opts()
        };
        let d = generate(&r, &o).unwrap();
        let names: Vec<&str> = d.compose.service_names().collect();
        assert_eq!(
            names,
            vec![
                "redis",
                "neo4j",
                "tinkergraph",
                "janusgraph",
                "pfscweb",
                "pfscwork0",
                "pfscwork1",
                "pfscwork2",
                "nginx"
            ]
        );
        let web = d.compose.service("pfscweb").unwrap();
        assert_eq!(
            web.depends_on,
            vec![
                "redis",
                "neo4j",
                "tinkergraph",
                "janusgraph",
                "pfscwork0",
                "pfscwork1",
                "pfscwork2"
            ]
        );
        assert_eq!(d.compose.service("pfscwork2").unwrap().command, vec!["worker"]);
        assert!(
            d.docker_env
                .as_deref()
                .unwrap()
                .contains("GRAPHDB_URI=bolt://neo4j:7687")
        );
    }

    #[test]
    fn neptune_warns_and_uses_placeholder() {
        let s = settings();
        let r = Renderer::new(&s).unwrap();
        let o = DeployOptions {
            gdb: vec![GdbCode::Np],
            ..opts()
        };
        let d = generate(&r, &o).unwrap();
        assert_eq!(d.warnings.len(), 1);
        assert!(d.warnings[0].contains("neptune"));
        assert!(d.compose.service("neptune").is_none());
        assert!(
            d.docker_env
                .as_deref()
                .unwrap()
                .contains("GRAPHDB_URI=wss://XXXXXXXXXXXXXXXXXXXXXXXXXXX.neptune.amazonaws.com:8182/gremlin")
        );
    }

    #[test]
    fn configured_neptune_does_not_warn() {
        let mut s = settings();
        s.neptune.uri_prefix = Some("db-1.cluster-abc.eu-west-1".to_owned());
        let r = Renderer::new(&s).unwrap();
        let o = DeployOptions {
            gdb: vec![GdbCode::Np],
            ..opts()
        };
        assert!(generate(&r, &o).unwrap().warnings.is_empty());
    }

    #[test]
    fn dummy_layout() {
        let s = settings();
        let r = Renderer::new(&s).unwrap();
        let o = DeployOptions {
            dummy: true,
            workers: 4,
            ..opts()
        };
        let d = generate(&r, &o).unwrap();
        let names: Vec<&str> = d.compose.service_names().collect();
        assert_eq!(names, vec!["redis", "pfscweb", "nginx"]);
        assert_eq!(
            d.compose.service("pfscweb").unwrap().image,
            "pfsc-dummy-server:latest"
        );
        assert_eq!(d.compose.service("nginx").unwrap().volumes.len(), 1);
    }

    #[test]
    fn oca_layout() {
        let s = settings();
        let r = Renderer::new(&s).unwrap();
        let o = DeployOptions {
            oca: true,
            tag: "0.24.1".to_owned(),
            ..opts()
        };
        let d = generate(&r, &o).unwrap();
        let names: Vec<&str> = d.compose.service_names().collect();
        assert_eq!(names, vec!["pise"]);
        assert!(d.nginx_conf.is_none());
        assert_eq!(d.files().unwrap().len(), 1);
    }

    #[test]
    fn yaml_keeps_service_order() {
        let s = settings();
        let r = Renderer::new(&s).unwrap();
        let yaml = generate(&r, &opts()).unwrap().compose.to_yaml().unwrap();
        assert!(yaml.contains("3.5"));
        assert!(yaml.contains("services:\n  redis:\n"));
        let web = yaml.find("  pfscweb:").unwrap();
        let nginx = yaml.find("  nginx:").unwrap();
        assert!(web < nginx);
    }

    #[test]
    fn write_to_creates_fresh_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let s = settings();
        let r = Renderer::new(&s).unwrap();
        let d = generate(&r, &opts()).unwrap();
        let dir = tmp.path().join("deploy").join("production_test");

        let written = d.write_to(&dir).unwrap();
        assert_eq!(written.len(), 3);
        for name in [COMPOSE_FILE_NAME, NGINX_CONF_FILE_NAME, DOCKER_ENV_FILE_NAME] {
            assert!(dir.join(name).is_file(), "missing {name}");
        }

        let err = d.write_to(&dir).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
