mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pfsc_build::BuildTarget;
use pfsc_core::Settings;

#[derive(Parser)]
#[command(name = "pfsc", about = "Build docker images and deployments for the Proofscape ISE")]
#[command(version)]
struct Cli {
    /// Directory holding conf.toml (the pfsc-manage checkout)
    #[arg(long, global = true, env = "PFSC_MANAGE_ROOT", default_value = ".")]
    manage_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build docker images
    Build {
        #[command(subcommand)]
        image: BuildCommand,
    },
    /// Generate deployment directories
    Deploy {
        #[command(subcommand)]
        action: DeployAction,
    },
}

#[derive(Args)]
struct BuildFlags {
    /// Dump the Dockerfile (and staged configs) to stdout before building
    #[arg(long)]
    dump: bool,
    /// Do not actually build; just print the docker command
    #[arg(long)]
    dry_run: bool,
    /// Tag for the new image
    tag: String,
}

#[derive(Subcommand)]
enum BuildCommand {
    /// Build a `pfsc-server` image
    Server {
        /// Include demo repos
        #[arg(long)]
        demos: bool,
        #[command(flatten)]
        flags: BuildFlags,
    },
    /// Build a `pise` (one-container app) image
    Oca {
        /// Release build: pin versions from pfsc-server and add the license file
        #[arg(long)]
        release: bool,
        #[command(flatten)]
        flags: BuildFlags,
    },
    /// Build a `pfsc-dummy-server` image (hello-world Flask app on port 7372)
    Dummy {
        #[command(flatten)]
        flags: BuildFlags,
    },
    /// Build a `pfsc-static-nginx` image serving all static assets
    Static {
        #[command(flatten)]
        flags: BuildFlags,
    },
    /// Build an `elkjs-build-env` image for building elkjs
    ElkjsBuilder {
        #[command(flatten)]
        flags: BuildFlags,
    },
    /// Build a `pfsc-redis` image with our redis.conf
    Redis {
        #[command(flatten)]
        flags: BuildFlags,
    },
    /// Build a `pfsc-redisgraph` image with frequent background dumps
    Redisgraph {
        #[command(flatten)]
        flags: BuildFlags,
    },
}

impl BuildCommand {
    fn into_parts(self) -> (BuildTarget, BuildFlags) {
        match self {
            Self::Server { demos, flags } => (BuildTarget::Server { demos }, flags),
            Self::Oca { release, flags } => (BuildTarget::Oca { release }, flags),
            Self::Dummy { flags } => (BuildTarget::Dummy, flags),
            Self::Static { flags } => (BuildTarget::Static, flags),
            Self::ElkjsBuilder { flags } => (BuildTarget::ElkjsBuilder, flags),
            Self::Redis { flags } => (BuildTarget::Redis, flags),
            Self::Redisgraph { flags } => (BuildTarget::RedisGraph, flags),
        }
    }
}

#[derive(Subcommand)]
enum DeployAction {
    /// Generate a docker-compose deployment under {pfsc_root}/deploy
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Graph databases, comma-separated (re, nj, tk, ja, np)
    #[arg(long, default_value = "re")]
    gdb: String,
    /// Number of worker containers
    #[arg(long, default_value_t = 1)]
    workers: u32,
    /// Mount demo repos into the server containers
    #[arg(long)]
    demos: bool,
    /// Mount server sources read-only (development)
    #[arg(long)]
    mount_code: bool,
    /// Comma-separated site-packages to mount from the local venv
    #[arg(long)]
    mount_pkg: Option<String>,
    /// Front a dummy server instead of pfsc-server
    #[arg(long)]
    dummy: bool,
    /// Single one-container app instead of the multi-container layout
    #[arg(long)]
    oca: bool,
    /// Flask config passed to the app containers
    #[arg(long, default_value = "production")]
    flask_config: String,
    /// Image tag for pfsc-server / pise
    #[arg(long, default_value = "latest")]
    tag: String,
    /// Deploy directory name (default: production_YYMMDD_HHMMSS)
    #[arg(long)]
    name: Option<String>,
    /// Dump generated files to stdout
    #[arg(long)]
    dump: bool,
    /// Print generated files; write nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.manage_root)?;

    match cli.command {
        Commands::Build { image } => {
            let (target, flags) = image.into_parts();
            let opts = commands::BuildOptions {
                tag: flags.tag,
                dump: flags.dump,
                dry_run: flags.dry_run,
            };
            commands::build(&settings, target, &opts).await?
        }
        Commands::Deploy { action } => match action {
            DeployAction::Generate(args) => commands::deploy_generate(
                &settings,
                commands::GenerateOptions {
                    gdb: args.gdb,
                    workers: args.workers,
                    demos: args.demos,
                    mount_code: args.mount_code,
                    mount_pkg: args.mount_pkg,
                    dummy: args.dummy,
                    oca: args.oca,
                    flask_config: args.flask_config,
                    tag: args.tag,
                    name: args.name,
                    dump: args.dump,
                    dry_run: args.dry_run,
                },
            )?,
        },
    }

    Ok(())
}
