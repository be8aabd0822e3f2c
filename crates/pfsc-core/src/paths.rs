//! Filesystem path conventions for a Proofscape installation.
//!
//! Path-valued settings are interpreted relative to the installation root
//! (`pfsc_root`) unless they begin with a slash.

use std::path::{Path, PathBuf};

/// Resolve a raw path-valued setting against the installation root.
///
/// - `None` stays `None`
/// - an empty string means the root itself
/// - a value starting with `/` is returned unchanged
/// - anything else is joined under `root`
///
/// # Examples
///
/// ```
/// use pfsc_core::paths::resolve_fs_path;
/// use std::path::{Path, PathBuf};
///
/// let root = Path::new("/opt/proofscape");
/// assert_eq!(resolve_fs_path(None, root), None);
/// assert_eq!(resolve_fs_path(Some("/srv/lib"), root), Some(PathBuf::from("/srv/lib")));
/// assert_eq!(resolve_fs_path(Some("lib"), root), Some(PathBuf::from("/opt/proofscape/lib")));
/// ```
pub fn resolve_fs_path(raw: Option<&str>, root: &Path) -> Option<PathBuf> {
    let raw = raw?;
    if raw.is_empty() {
        return Some(root.to_path_buf());
    }
    if raw.starts_with('/') {
        return Some(PathBuf::from(raw));
    }
    Some(root.join(raw))
}

/// Split the configured URL prefix into `(root_url, app_url_prefix)`.
///
/// No single string can be prepended to both the root URL and extended
/// paths, so two are returned:
///
/// ```text
/// empty prefix:   /  -> /            /some/path -> /some/path
/// /my/prefix:     /  -> /my/prefix   /some/path -> /my/prefix/some/path
/// ```
///
/// # Examples
///
/// ```
/// use pfsc_core::paths::check_app_url_prefix;
///
/// assert_eq!(check_app_url_prefix(None), ("/".to_owned(), String::new()));
/// assert_eq!(
///     check_app_url_prefix(Some("/my/prefix/")),
///     ("/my/prefix".to_owned(), "/my/prefix".to_owned()),
/// );
/// ```
pub fn check_app_url_prefix(raw: Option<&str>) -> (String, String) {
    let pre = match raw {
        Some(raw) => raw.trim_matches('/'),
        None => "",
    };
    if pre.is_empty() {
        ("/".to_owned(), String::new())
    } else {
        (format!("/{pre}"), format!("/{pre}"))
    }
}

/// Create `path` and any missing parents.
///
/// With `exist_ok == false` an existing directory is an error, so callers
/// never write into a directory they did not create.
pub fn make_dirs(path: &Path, exist_ok: bool) -> crate::Result<()> {
    if !exist_ok && path.exists() {
        return Err(crate::Error::DirExists(path.to_path_buf()));
    }
    std::fs::create_dir_all(path).map_err(|e| crate::Error::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "directory ready");
    Ok(())
}

/// Root of the source checkouts (`{pfsc_root}/src`), used as build context.
pub fn src_root(pfsc_root: &Path) -> PathBuf {
    pfsc_root.join("src")
}

/// Scratch area for per-build staging directories.
pub fn src_tmp_root(pfsc_root: &Path) -> PathBuf {
    src_root(pfsc_root).join("tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_raw_is_root() {
        let root = Path::new("/opt/pfsc");
        assert_eq!(resolve_fs_path(Some(""), root), Some(root.to_path_buf()));
    }

    #[test]
    fn relative_raw_joins_root() {
        let root = Path::new("/opt/pfsc");
        assert_eq!(
            resolve_fs_path(Some("deploy/ssl/cert.pem"), root),
            Some(PathBuf::from("/opt/pfsc/deploy/ssl/cert.pem"))
        );
    }

    #[test]
    fn prefix_without_slashes() {
        assert_eq!(
            check_app_url_prefix(Some("my/prefix")),
            ("/my/prefix".to_owned(), "/my/prefix".to_owned())
        );
    }

    #[test]
    fn prefix_only_slashes_is_empty() {
        assert_eq!(
            check_app_url_prefix(Some("//")),
            ("/".to_owned(), String::new())
        );
    }

    #[test]
    fn make_dirs_refuses_existing_when_not_ok() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = make_dirs(tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        make_dirs(tmp.path(), true).unwrap();
    }

    #[test]
    fn make_dirs_creates_parents() {
        let tmp = tempfile::TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        make_dirs(&nested, false).unwrap();
        assert!(nested.is_dir());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn absolute_values_pass_through(raw in "/[a-z0-9/_.-]{0,30}") {
                let root = Path::new("/opt/pfsc");
                prop_assert_eq!(resolve_fs_path(Some(&raw), root), Some(PathBuf::from(&raw)));
            }

            #[test]
            fn relative_values_land_under_root(raw in "[a-z0-9_][a-z0-9/_.-]{0,30}") {
                let root = Path::new("/opt/pfsc");
                let resolved = resolve_fs_path(Some(&raw), root).unwrap();
                prop_assert!(resolved.starts_with(root));
            }

            #[test]
            fn surrounding_slashes_do_not_matter(core in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
                let bare = check_app_url_prefix(Some(&core));
                let slashed = check_app_url_prefix(Some(&format!("/{core}/")));
                prop_assert_eq!(&bare, &slashed);
                prop_assert_eq!(bare.0, format!("/{core}"));
            }
        }
    }
}
