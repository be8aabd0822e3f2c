//! Configuration files staged into images or written into deploy directories.

use pfsc_core::FsPathVar;

use crate::templates::{Renderer, TemplateError};

/// Which supervisord programs the pfsc ini file declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorPrograms {
    pub worker: bool,
    pub web: bool,
    /// Run through `venv/bin` rather than the system interpreter.
    pub use_venv: bool,
    /// Use the OCA Flask config.
    pub oca: bool,
}

/// Values for the `.env` file mounted into pfsc-server containers.
#[derive(Debug, Clone)]
pub struct DockerEnv<'a> {
    pub flask_config: &'a str,
    pub graphdb_uri: &'a str,
}

impl Renderer<'_> {
    /// nginx.conf baked into the `pfsc-static-nginx` image.
    pub fn static_nginx_conf(&self) -> Result<String, TemplateError> {
        self.render("static_nginx.conf", &self.context())
    }

    /// nginx.conf for the reverse proxy of a multi-container deployment.
    pub fn front_nginx_conf(&self, dummy: bool) -> Result<String, TemplateError> {
        let web = &self.settings().web;
        let mut ctx = self.context();
        ctx.insert("dummy", &dummy);
        ctx.insert("ssl", &web.ssl);
        ctx.insert("auth_basic", &web.auth_basic_password.is_some());
        ctx.insert("redirect_http_from", &web.redirect_http_from);
        ctx.insert("use_remote_wheels", &web.use_remote_wheels);
        let twin_site = self
            .settings()
            .configured_fs_path(FsPathVar::TwinRootDir)
            .is_some();
        ctx.insert("twin_site", &twin_site);
        self.render("front_nginx.conf", &ctx)
    }

    pub fn redis_conf(&self) -> Result<String, TemplateError> {
        self.render("redis.conf", &self.context())
    }

    pub fn redisgraph_conf(&self) -> Result<String, TemplateError> {
        self.render("redisgraph.conf", &self.context())
    }

    pub fn supervisor_pfsc_ini(&self, programs: SupervisorPrograms) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("worker", &programs.worker);
        ctx.insert("web", &programs.web);
        ctx.insert("use_venv", &programs.use_venv);
        ctx.insert("oca", &programs.oca);
        self.render("supervisor_pfsc.ini", &ctx)
    }

    pub fn supervisor_redisgraph_ini(&self, use_conf_file: bool) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("use_conf_file", &use_conf_file);
        self.render("supervisor_redisgraph.ini", &ctx)
    }

    pub fn oca_eula(&self, tag: &str) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("tag", tag);
        self.render("oca_eula.txt", &ctx)
    }

    /// Hello-world Flask app served by the dummy server image.
    pub fn dummy_web_py(&self) -> Result<String, TemplateError> {
        self.render("dummy_web.py", &self.context())
    }

    pub fn docker_env(&self, env: &DockerEnv<'_>) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("flask_config", env.flask_config);
        ctx.insert("graphdb_uri", env.graphdb_uri);
        self.render("docker.env", &ctx)
    }
}
