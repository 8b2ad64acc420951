use std::path::PathBuf;

use tracing::info;
use unikboot::{
    builder::{blk::BlkBuilder, executor::DockerExecutorBuilder, Builder, RumpConfigBuilder},
    image::ImageBuilder,
    rump::to_rump_json,
};

/// This example turns a unikernel binary into a bootable disk image, with one
/// data volume mounted at `/data`.
///
/// Requirements:
/// - A Docker engine reachable through `DOCKER_HOST` or `/var/run/docker.sock`
/// - The `boot-creator` image available locally
/// - A rump kernel binary, given as the first argument
///
/// The image path is printed once done, delete the file when you don't need it
/// anymore.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let kernel = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: build_image <kernel>")?;

    let data = BlkBuilder::new()
        .with_source("dev".to_string())
        .with_path("/dev/ld0a".to_string())
        .with_fstype("blk".to_string())
        .with_mountpoint("/data".to_string())
        .try_build()?;
    let config = RumpConfigBuilder::new()
        .with_program(Vec::new())
        .with_blk(data)
        .try_build()?;
    let cmdline = to_rump_json(&config)?;
    info!("Kernel command line: {}", cmdline);

    let executor = DockerExecutorBuilder::auto()?.try_build()?;
    let image = ImageBuilder::new(executor)
        .build_bootable_image(&kernel, &cmdline)
        .await?;
    println!("{}", image.display());
    Ok(())
}
