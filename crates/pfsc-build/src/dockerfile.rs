//! Dockerfiles for each buildable image.
//!
//! `tmp_dir` arguments are staging directories relative to `{pfsc_root}/src`,
//! which is the build context of every image.

use crate::templates::{Renderer, TemplateError};

/// File name of the combined license file inside the OCA image.
pub const LICENSE_FILE_NAME: &str = "LICENSES.txt";

impl Renderer<'_> {
    pub fn server_dockerfile(&self, demos: bool) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("demos", &demos);
        self.render("server.Dockerfile", &ctx)
    }

    /// One-container app: pfsc-server, static assets and RedisGraph under supervisord.
    pub fn oca_dockerfile(&self, tmp_dir: &str, release: bool) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("tmp_dir", tmp_dir);
        ctx.insert("release", &release);
        ctx.insert(
            "redisgraph_image_tag",
            &self.settings().redisgraph.image_tag,
        );
        self.render("oca.Dockerfile", &ctx)
    }

    pub fn dummy_dockerfile(&self, tmp_dir: &str) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("tmp_dir", tmp_dir);
        self.render("dummy.Dockerfile", &ctx)
    }

    pub fn static_dockerfile(&self, tmp_dir: &str) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("tmp_dir", tmp_dir);
        ctx.insert("nginx_image_tag", &self.settings().nginx.image_tag);
        self.render("static.Dockerfile", &ctx)
    }

    pub fn elkjs_build_env_dockerfile(&self) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("elkjs_version", &self.settings().versions.elkjs);
        self.render("elkjs_build_env.Dockerfile", &ctx)
    }

    pub fn redis_dockerfile(&self, tmp_dir: &str) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("tmp_dir", tmp_dir);
        ctx.insert("redis_image_tag", &self.settings().redis.image_tag);
        self.render("redis.Dockerfile", &ctx)
    }

    pub fn redisgraph_dockerfile(&self, tmp_dir: &str) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("tmp_dir", tmp_dir);
        ctx.insert(
            "redisgraph_image_tag",
            &self.settings().redisgraph.image_tag,
        );
        self.render("redisgraph.Dockerfile", &ctx)
    }
}

/// Second OCA layer: the phase-one image plus the combined license file.
pub fn license_layer_dockerfile(base_image: &str, tmp_dir: &str) -> String {
    format!(
        "FROM {base_image}\n\
         COPY {tmp_dir}/{LICENSE_FILE_NAME} ./\n\
         USER root\n\
         RUN chown pfsc:pfsc {LICENSE_FILE_NAME}\n\
         USER pfsc\n"
    )
}
