//! Metadata read out of the `pfsc-server` checkout.
//!
//! Release builds pin supporting-software versions to the defaults
//! recorded in `src/pfsc-server/pfsc.ini` rather than whatever the local
//! `conf.toml` says.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::SoftwareVersions;

static SERVER_VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__version__ = (.+)\n").unwrap());

/// `{pfsc_root}/src/pfsc-server/pfsc.ini`
pub fn server_ini_path(pfsc_root: &Path) -> PathBuf {
    pfsc_root.join("src").join("pfsc-server").join("pfsc.ini")
}

impl SoftwareVersions {
    /// Read the `[versions]` section of the pfsc-server ini file.
    pub fn from_server_ini(pfsc_root: &Path) -> crate::Result<Self> {
        let path = server_ini_path(pfsc_root);
        let content =
            std::fs::read_to_string(&path).map_err(|e| crate::Error::ServerFileRead {
                path: path.clone(),
                source: e,
            })?;
        Self::parse_ini(&content, &path)
    }

    fn parse_ini(content: &str, path: &Path) -> crate::Result<Self> {
        let section = ini_section(content, "versions");
        let get = |key: &'static str| -> crate::Result<String> {
            section
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| crate::Error::MissingVersion {
                    path: path.to_path_buf(),
                    key,
                })
        };

        let versions = Self {
            ise: get("ise")?,
            elkjs: get("elkjs")?,
            mathjax: get("mathjax")?,
            pyodide: get("pyodide")?,
            examp: get("examp")?,
            pdfjs: get("pdf")?,
        };
        tracing::debug!(path = %path.display(), ?versions, "read server versions");
        Ok(versions)
    }
}

/// Key/value pairs of one `[section]` of an ini document.
///
/// Keys are lower-cased; `key = value` and `key: value` are both accepted,
/// and `#`/`;` lines are comments.
fn ini_section(content: &str, name: &str) -> Vec<(String, String)> {
    let mut in_section = false;
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = header.trim() == name;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once(['=', ':']) {
            pairs.push((key.trim().to_lowercase(), value.trim().to_owned()));
        }
    }
    pairs
}

/// Version number of pfsc-server, from `pfsc/__init__.py`.
pub fn server_version(pfsc_root: &Path) -> crate::Result<String> {
    let path = pfsc_root
        .join("src")
        .join("pfsc-server")
        .join("pfsc")
        .join("__init__.py");
    let text = std::fs::read_to_string(&path).map_err(|e| crate::Error::ServerFileRead {
        path: path.clone(),
        source: e,
    })?;
    let raw = SERVER_VERSION_PATTERN
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| crate::Error::MissingServerVersion { path: path.clone() })?;
    // Cut quotation marks.
    let version = match raw
        .strip_prefix(['"', '\''])
        .and_then(|r| r.strip_suffix(['"', '\'']))
    {
        Some(unquoted) => unquoted,
        None => raw,
    };
    Ok(version.to_owned())
}
