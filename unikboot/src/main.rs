use std::{
    fs::File,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use unikboot::{
    builder::{executor::DockerExecutorBuilder, Builder},
    image::{ImageBuilder, BOOT_CREATOR_IMAGE},
    rump::to_rump_json,
};
use unikboot_models::models::RumpConfig;

#[derive(Parser)]
#[command(name = "unikboot")]
#[command(about = "Build bootable unikernel disk images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a unikernel binary into a bootable disk image
    Build {
        /// Path to the unikernel binary
        #[arg(long)]
        kernel: PathBuf,

        /// Kernel command line
        #[arg(long, conflicts_with = "rump_config", required_unless_present = "rump_config")]
        cmdline: Option<String>,

        /// JSON rump configuration, encoded and used as the command line
        #[arg(long)]
        rump_config: Option<PathBuf>,

        /// Image assembling the volume
        #[arg(long, default_value = BOOT_CREATOR_IMAGE)]
        image: String,

        /// Docker engine socket, defaults to DOCKER_HOST or /var/run/docker.sock
        #[arg(long)]
        socket: Option<PathBuf>,

        /// Directory for staging and for the resulting image
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },
    /// Print the rump encoding of a JSON rump configuration
    RumpJson {
        /// Path to the JSON configuration
        config: PathBuf,
    },
}

fn read_rump_config(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let config: RumpConfig = serde_json::from_reader(File::open(path)?)?;
    Ok(to_rump_json(&config)?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            kernel,
            cmdline,
            rump_config,
            image,
            socket,
            temp_dir,
        } => {
            let cmdline = match (cmdline, rump_config) {
                (Some(cmdline), _) => cmdline,
                (None, Some(path)) => read_rump_config(&path)?,
                (None, None) => return Err("either --cmdline or --rump-config is needed".into()),
            };

            let executor = match socket {
                Some(socket) => DockerExecutorBuilder::new().with_socket_path(socket),
                None => DockerExecutorBuilder::auto()?,
            }
            .try_build()?;
            tracing::debug!("Using engine socket {:?}", executor.socket());

            let mut builder = ImageBuilder::new(executor).with_image(image);
            if let Some(temp_dir) = temp_dir {
                builder = builder.with_temp_root(temp_dir);
            }

            let path = builder.build_bootable_image(&kernel, &cmdline).await?;
            println!("{}", path.display());
        }
        Commands::RumpJson { config } => {
            println!("{}", read_rump_config(&config)?);
        }
    }

    Ok(())
}
