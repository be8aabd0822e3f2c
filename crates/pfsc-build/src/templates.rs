//! Tera rendering of Dockerfiles and configuration files.
//!
//! All templates are compiled into the binary. Every rendered artifact goes
//! through [`strip_headers`] and [`squash`] before it is returned.

use std::sync::LazyLock;

use pfsc_core::Settings;
use regex::Regex;
use tera::{Context, Tera};

use crate::header::strip_headers;
use crate::services::PYTHON_VERSION;

const TEMPLATES: [(&str, &str); 17] = [
    ("server.Dockerfile", include_str!("../templates/server.Dockerfile.tera")),
    ("oca.Dockerfile", include_str!("../templates/oca.Dockerfile.tera")),
    ("dummy.Dockerfile", include_str!("../templates/dummy.Dockerfile.tera")),
    ("static.Dockerfile", include_str!("../templates/static.Dockerfile.tera")),
    (
        "elkjs_build_env.Dockerfile",
        include_str!("../templates/elkjs_build_env.Dockerfile.tera"),
    ),
    ("redis.Dockerfile", include_str!("../templates/redis.Dockerfile.tera")),
    (
        "redisgraph.Dockerfile",
        include_str!("../templates/redisgraph.Dockerfile.tera"),
    ),
    ("dummy_web.py", include_str!("../templates/dummy_web.py.tera")),
    ("static_nginx.conf", include_str!("../templates/static_nginx.conf.tera")),
    ("front_nginx.conf", include_str!("../templates/front_nginx.conf.tera")),
    ("redis.conf", include_str!("../templates/redis.conf.tera")),
    ("redisgraph.conf", include_str!("../templates/redisgraph.conf.tera")),
    (
        "supervisor_pfsc.ini",
        include_str!("../templates/supervisor_pfsc.ini.tera"),
    ),
    (
        "supervisor_redisgraph.ini",
        include_str!("../templates/supervisor_redisgraph.ini.tera"),
    ),
    ("oca_eula.txt", include_str!("../templates/oca_eula.txt.tera")),
    (
        "combined_license.txt",
        include_str!("../templates/combined_license.txt.tera"),
    ),
    ("docker.env", include_str!("../templates/docker.env.tera")),
];

static BLANK_RUN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to load built-in templates")]
    Load { source: tera::Error },

    #[error("failed to render template '{name}'")]
    Render {
        name: &'static str,
        source: tera::Error,
    },
}

/// Collapse every run of blank (or whitespace-only) lines into one blank line.
pub fn squash(text: &str) -> String {
    BLANK_RUN_PATTERN.replace_all(text, "\n\n").into_owned()
}

/// Renders the built-in templates against one set of [`Settings`].
pub struct Renderer<'a> {
    settings: &'a Settings,
    tera: Tera,
}

impl<'a> Renderer<'a> {
    pub fn new(settings: &'a Settings) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(TEMPLATES)
            .map_err(|e| TemplateError::Load { source: e })?;
        Ok(Self { settings, tera })
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Context shared by every template: versions, URL prefix and Python version.
    pub(crate) fn context(&self) -> Context {
        let (root_url, app_url_prefix) = self.settings.app_url_prefix();
        let mut ctx = Context::new();
        ctx.insert("versions", &self.settings.versions);
        ctx.insert("root_url", &root_url);
        ctx.insert("app_url_prefix", &app_url_prefix);
        ctx.insert("python_version", PYTHON_VERSION);
        ctx
    }

    pub(crate) fn render(&self, name: &'static str, ctx: &Context) -> Result<String, TemplateError> {
        let raw = self
            .tera
            .render(name, ctx)
            .map_err(|e| TemplateError::Render { name, source: e })?;
        let text = squash(&strip_headers(&raw));
        tracing::trace!(template = name, bytes = text.len(), "rendered");
        Ok(text.trim_start_matches('\n').to_owned())
    }
}
