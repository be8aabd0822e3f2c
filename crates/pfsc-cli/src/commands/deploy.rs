use pfsc_build::compose::{self, DeployOptions};
use pfsc_build::{Renderer, parse_gdb_list};
use pfsc_core::Settings;

use super::dump_text_with_title;

pub struct GenerateOptions {
    pub gdb: String,
    pub workers: u32,
    pub demos: bool,
    pub mount_code: bool,
    pub mount_pkg: Option<String>,
    pub dummy: bool,
    pub oca: bool,
    pub flask_config: String,
    pub tag: String,
    pub name: Option<String>,
    pub dump: bool,
    pub dry_run: bool,
}

/// Generate a new deploy directory under `{pfsc_root}/deploy`.
pub fn deploy_generate(settings: &Settings, opts: GenerateOptions) -> anyhow::Result<()> {
    let gdb = parse_gdb_list(&opts.gdb)?;
    let name = match opts.name {
        Some(name) => name,
        None => chrono::Local::now().format("production_%y%m%d_%H%M%S").to_string(),
    };
    let deploy_dir = settings.pfsc_root.join("deploy").join(&name);

    let renderer = Renderer::new(settings)?;
    let deployment = compose::generate(
        &renderer,
        &DeployOptions {
            deploy_dir: deploy_dir.clone(),
            gdb,
            workers: opts.workers,
            demos: opts.demos,
            mount_code: opts.mount_code,
            mount_pkg: opts.mount_pkg,
            dummy: opts.dummy,
            oca: opts.oca,
            flask_config: opts.flask_config,
            tag: opts.tag,
        },
    )?;

    for warning in &deployment.warnings {
        println!("Warning: {warning}");
    }

    if opts.dump || opts.dry_run {
        for (file_name, contents) in deployment.files()? {
            dump_text_with_title(&contents, file_name);
        }
    }
    if opts.dry_run {
        return Ok(());
    }

    deployment.write_to(&deploy_dir)?;
    println!("Wrote deployment to {}", deploy_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn opts(name: &str) -> GenerateOptions {
        GenerateOptions {
            gdb: "re".to_owned(),
            workers: 2,
            demos: false,
            mount_code: false,
            mount_pkg: None,
            dummy: false,
            oca: false,
            flask_config: "production".to_owned(),
            tag: "latest".to_owned(),
            name: Some(name.to_owned()),
            dump: false,
            dry_run: false,
        }
    }

    #[test]
    fn writes_compose_nginx_and_env() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::with_roots(tmp.path().join("pfsc-manage"), tmp.path());

        deploy_generate(&settings, opts("d1")).unwrap();

        let dir = tmp.path().join("deploy/d1");
        let compose = std::fs::read_to_string(dir.join("docker-compose.yml")).unwrap();
        assert!(compose.contains("pfscwork0"));
        assert!(compose.contains("pfscwork1"));
        assert!(dir.join("nginx.conf").is_file());
        assert!(dir.join("docker.env").is_file());
    }

    #[test]
    fn existing_directory_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::with_roots(tmp.path().join("pfsc-manage"), tmp.path());
        std::fs::create_dir_all(tmp.path().join("deploy/taken")).unwrap();

        assert!(deploy_generate(&settings, opts("taken")).is_err());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::with_roots(tmp.path().join("pfsc-manage"), tmp.path());

        deploy_generate(
            &settings,
            GenerateOptions {
                dry_run: true,
                ..opts("d2")
            },
        )
        .unwrap();
        assert!(!tmp.path().join("deploy").exists());
    }

    #[test]
    fn oca_deployment_has_no_nginx_conf() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::with_roots(tmp.path().join("pfsc-manage"), tmp.path());

        deploy_generate(
            &settings,
            GenerateOptions {
                oca: true,
                ..opts("oca")
            },
        )
        .unwrap();
        let dir = tmp.path().join("deploy/oca");
        assert!(dir.join("docker-compose.yml").is_file());
        assert!(!dir.join("nginx.conf").exists());
    }

    #[test]
    fn ssl_without_key_fails_before_writing() {
        let tmp = TempDir::new().unwrap();
        let mut settings = Settings::with_roots(tmp.path().join("pfsc-manage"), tmp.path());
        settings.web.ssl = true;
        settings.paths.ssl_cert = Some("ssl/cert.pem".to_owned());

        let err = deploy_generate(&settings, opts("ssl")).unwrap_err();
        assert!(err.to_string().contains("paths.ssl_key"));
        assert!(!tmp.path().join("deploy").exists());
    }

    #[test]
    fn unknown_gdb_code_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::with_roots(tmp.path().join("pfsc-manage"), tmp.path());

        let err = deploy_generate(
            &settings,
            GenerateOptions {
                gdb: "re,xx".to_owned(),
                ..opts("bad")
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("'xx'"));
        assert!(!tmp.path().join("deploy").exists());
    }
}
