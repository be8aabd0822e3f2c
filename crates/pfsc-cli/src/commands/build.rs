use anyhow::Context;
use pfsc_build::dockerfile::{LICENSE_FILE_NAME, license_layer_dockerfile};
use pfsc_build::targets::oca_license_file;
use pfsc_build::{BuildTarget, Renderer, parse_pip_freeze};
use pfsc_core::versions::server_version;
use pfsc_core::{Settings, SoftwareVersions};
use pfsc_docker::{BuildRequest, DockerClient, DockerExecutor};

use super::dump_text_with_title;

pub struct BuildOptions {
    pub tag: String,
    pub dump: bool,
    pub dry_run: bool,
}

/// Build one image with the configured docker command.
pub async fn build(settings: &Settings, target: BuildTarget, opts: &BuildOptions) -> anyhow::Result<()> {
    let client = DockerClient::new(&settings.docker.cmd)?;
    run(settings, &client, target, opts).await
}

async fn run<E: DockerExecutor>(
    settings: &Settings,
    client: &DockerClient<E>,
    target: BuildTarget,
    opts: &BuildOptions,
) -> anyhow::Result<()> {
    let release = matches!(target, BuildTarget::Oca { release: true });

    let mut settings = settings.clone();
    if release {
        settings.versions = SoftwareVersions::from_server_ini(&settings.pfsc_root)?;
        tracing::info!(versions = ?settings.versions, "pinned supporting software versions");
    }

    if !opts.dry_run {
        target.check_preconditions(&settings)?;
    }

    let renderer = Renderer::new(&settings)?;
    let prepared = target.prepare(&renderer, &opts.tag)?;

    // The OCA release image is built in two phases so the installed packages
    // can be read out of the first one for the license file.
    let two_phase = release && !opts.dry_run;
    let phase_one_tag = if two_phase {
        format!("{}-without-license-file", opts.tag)
    } else {
        opts.tag.clone()
    };

    if opts.dump {
        dump_text_with_title(&prepared.dockerfile, "Dockerfile");
        for (title, text) in &prepared.dumps {
            dump_text_with_title(text, title);
        }
    }
    let request = BuildRequest {
        image: prepared.image.to_owned(),
        tag: phase_one_tag,
        context: settings.src_root(),
        dockerfile: prepared.dockerfile.clone(),
    };
    println!("{}", client.command_line(&request));
    client.build(&request, opts.dry_run).await?;

    if !two_phase {
        return Ok(());
    }

    let base_image = request.reference();
    let freeze = client.pip_freeze(&base_image).await?;
    let packages = parse_pip_freeze(&freeze);
    let license = renderer.combined_license(
        &base_image,
        &server_version(&settings.pfsc_root)?,
        &packages,
    )?;

    let vc_copy = oca_license_file(&settings.manage_root);
    std::fs::write(&vc_copy, &license)
        .with_context(|| format!("failed to write {}", vc_copy.display()))?;
    tracing::info!(path = %vc_copy.display(), packages = packages.len(), "updated combined license file");

    let staging = prepared
        .staging
        .as_ref()
        .context("OCA build has no staging directory")?;
    staging.write(LICENSE_FILE_NAME, &license)?;

    let request = BuildRequest {
        image: prepared.image.to_owned(),
        tag: opts.tag.clone(),
        context: settings.src_root(),
        dockerfile: license_layer_dockerfile(&base_image, staging.relative_path()),
    };
    println!("{}", client.command_line(&request));
    client.build(&request, false).await?;
    Ok(())
}
