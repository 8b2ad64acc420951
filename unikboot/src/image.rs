//! # Build a Bootable Disk Image (recommended)
//!
//! This module uses a [ContainerRunner] to turn a unikernel binary into a
//! bootable disk image. The heavy lifting happens in the `boot-creator`
//! image; this side stages the kernel in a scratch directory shared with the
//! container and collects what it produced.
//!
//! ## Example
//!
//! ```ignore
//! use std::path::Path;
//! use unikboot::builder::{executor::DockerExecutorBuilder, Builder};
//! use unikboot::image::ImageBuilder;
//!
//! let executor = DockerExecutorBuilder::auto().unwrap().try_build().unwrap();
//! let builder = ImageBuilder::new(executor);
//! let image = builder
//!     .build_bootable_image(Path::new("./program"), "{\"cmdline\":\"program.bin\"}")
//!     .await
//!     .unwrap();
//! println!("disk image ready at {}", image.display());
//! ```

use std::{
    env::temp_dir,
    fs::{copy, rename},
    path::{Path, PathBuf},
};

use tempfile::{Builder as TempBuilder, TempDir};
use tracing::{debug, info, instrument};

use crate::{
    builder::{container::ContainerSpecBuilder, Builder, BuilderError},
    executor::{ContainerRuntime, ExecuteError},
    runner::ContainerRunner,
};

/// Image assembling the bootable volume
pub const BOOT_CREATOR_IMAGE: &str = "boot-creator";
/// Where the staging directory is mounted inside the boot-creator container
pub const VOLUME_MOUNT_POINT: &str = "/opt/vol";
/// Name of the kernel inside the staging directory
pub const PROGRAM_FILE_NAME: &str = "program.bin";
/// Name of the disk image written back by boot-creator
pub const IMAGE_FILE_NAME: &str = "vol.img";

#[derive(thiserror::Error, Debug)]
pub enum BootError {
    /// Staging directory could not be created or filled
    #[error("Could not stage the kernel, reason: {0}")]
    Setup(String),
    /// The produced image could not be moved out of the staging directory
    #[error("Could not collect the disk image, reason: {0}")]
    Collect(String),
    #[error("Invalid container configuration: {0}")]
    Builder(#[from] BuilderError),
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Produces bootable disk images out of unikernel binaries
#[derive(Debug)]
pub struct ImageBuilder<R> {
    runner: ContainerRunner<R>,
    /// Image run to assemble the volume
    image: String,
    /// Directory holding both the staging directories and the results
    temp_root: PathBuf,
}

impl<R: ContainerRuntime> ImageBuilder<R> {
    pub fn new(runtime: R) -> ImageBuilder<R> {
        ImageBuilder {
            runner: ContainerRunner::new(runtime),
            image: BOOT_CREATOR_IMAGE.to_string(),
            temp_root: temp_dir(),
        }
    }

    /// Use another boot-creator image, e.g. a tagged or mirrored one
    pub fn with_image(self, image: String) -> ImageBuilder<R> {
        ImageBuilder { image, ..self }
    }

    /// Stage and store images under `temp_root` instead of the OS temp dir.
    /// Staging directory and result must share a file system for the final
    /// rename to work.
    pub fn with_temp_root(self, temp_root: PathBuf) -> ImageBuilder<R> {
        ImageBuilder { temp_root, ..self }
    }

    pub fn runner(&self) -> &ContainerRunner<R> {
        &self.runner
    }

    /// Build a bootable disk image running `kernel` with `cmdline`.
    ///
    /// 1. Stage the kernel as `program.bin` in a scratch directory
    /// 2. Run boot-creator, privileged, with the scratch directory mounted
    /// 3. Move the produced `vol.img` to a new temp file
    ///
    /// The scratch directory is removed on every path out of this function.
    /// The returned file belongs to the caller, who has to delete it.
    #[instrument(skip(self, cmdline), fields(image = %self.image))]
    pub async fn build_bootable_image(
        &self,
        kernel: &Path,
        cmdline: &str,
    ) -> Result<PathBuf, BootError> {
        let workspace = TempBuilder::new()
            .prefix("unikboot-stage-")
            .tempdir_in(&self.temp_root)
            .map_err(|e| {
                BootError::Setup(format!(
                    "Failed to create staging directory in {:?}: {}",
                    self.temp_root, e
                ))
            })?;
        debug!("Staging directory at {}", workspace.path().display());

        let program = workspace.path().join(PROGRAM_FILE_NAME);
        info!("Copy kernel in the staging directory");
        copy(kernel, &program).map_err(|e| {
            BootError::Setup(format!("Failed to copy {:?} to {:?}: {}", kernel, program, e))
        })?;

        let spec = ContainerSpecBuilder::new()
            .with_image(self.image.clone())
            .with_args(vec![
                "-d".to_string(),
                VOLUME_MOUNT_POINT.to_string(),
                "-p".to_string(),
                PROGRAM_FILE_NAME.to_string(),
                "-a".to_string(),
                cmdline.to_string(),
            ])
            .with_bind(workspace.path(), VOLUME_MOUNT_POINT)
            .as_privileged()
            .try_build()?;

        info!("Run boot-creator");
        self.runner.run(spec).await?;

        let image = self.collect(&workspace)?;
        info!("Disk image ready at {}", image.display());
        Ok(image)
    }

    /// Move the produced image next to the staging directory, into a file
    /// that outlives it
    fn collect(&self, workspace: &TempDir) -> Result<PathBuf, BootError> {
        let produced = workspace.path().join(IMAGE_FILE_NAME);
        let target = TempBuilder::new()
            .prefix("unikboot-")
            .suffix(".img")
            .tempfile_in(&self.temp_root)
            .map_err(|e| BootError::Collect(format!("Failed to create result file: {}", e)))?;

        debug!("Image from {:?} to {:?}", produced, target.path());
        rename(&produced, target.path()).map_err(|e| {
            BootError::Collect(format!(
                "Failed to move {:?} to {:?}: {}",
                produced,
                target.path(),
                e
            ))
        })?;

        let (_, path) = target
            .keep()
            .map_err(|e| BootError::Collect(format!("Failed to keep result file: {}", e)))?;
        Ok(path)
    }
}
