//! Combined license file for the one-container app.

use serde::Serialize;

use crate::templates::{Renderer, TemplateError};

/// One installed Python distribution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Package {
    pub name: String,
    pub version: String,
}

/// Parse `pip list --format=freeze` output.
///
/// `name==version` lines become packages; direct references
/// (`name @ url`) are kept with version `(direct)`. Anything else is
/// skipped. The result is sorted case-insensitively by name.
pub fn parse_pip_freeze(output: &str) -> Vec<Package> {
    let mut packages: Vec<Package> = output
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some((name, version)) = line.split_once("==") {
                Some(Package {
                    name: name.trim().to_owned(),
                    version: version.trim().to_owned(),
                })
            } else {
                line.split_once(" @ ").map(|(name, _)| Package {
                    name: name.trim().to_owned(),
                    version: "(direct)".to_owned(),
                })
            }
        })
        .filter(|p| !p.name.is_empty())
        .collect();
    packages.sort_by_key(|p| p.name.to_lowercase());
    packages
}

impl Renderer<'_> {
    /// License text for `image` listing every installed package.
    pub fn combined_license(
        &self,
        image: &str,
        server_version: &str,
        packages: &[Package],
    ) -> Result<String, TemplateError> {
        let mut ctx = self.context();
        ctx.insert("image", image);
        ctx.insert("server_version", server_version);
        ctx.insert("packages", packages);
        self.render("combined_license.txt", &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfsc_core::Settings;

    #[test]
    fn parses_freeze_output() {
        let out = "Werkzeug==2.0.3\nflask==2.0.1\n\n# comment\n-e git+https://x/y.git#egg=z\npfsc-util @ file:///tmp/whl/pfsc_util-0.1.whl\n";
        let pkgs = parse_pip_freeze(out);
        let names: Vec<&str> = pkgs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["flask", "pfsc-util", "Werkzeug"]);
        assert_eq!(pkgs[0].version, "2.0.1");
        assert_eq!(pkgs[1].version, "(direct)");
    }

    #[test]
    fn empty_output_has_no_packages() {
        assert!(parse_pip_freeze("").is_empty());
        assert!(parse_pip_freeze("==1.0\n").is_empty());
    }

    #[test]
    fn license_lists_packages() {
        let s = Settings::with_roots("/m", "/p");
        let r = Renderer::new(&s).unwrap();
        let text = r
            .combined_license(
                "pise:0.24.1-without-license-file",
                "0.24.1",
                &parse_pip_freeze("redis==3.5.3\nFlask==2.0.1\n"),
            )
            .unwrap();
        assert!(text.starts_with("Combined license file for pise:0.24.1-without-license-file\n"));
        assert!(text.contains("(pfsc-server 0.24.1, pfsc-ise 0.24.0)"));
        let flask = text.find("  Flask 2.0.1").unwrap();
        let redis = text.find("  redis 3.5.3").unwrap();
        assert!(flask < redis);
    }
}
