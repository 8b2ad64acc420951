//! # Run a Container to Completion
//!
//! [ContainerRunner] drives a single container through its whole life:
//! create, start, wait, remove. It only succeeds when the container exits
//! with status 0; any other status is reported as
//! [ExecuteError::NonZeroExit] once the container output has been logged.
//!
//! ## Example
//!
//! ```ignore
//! use unikboot::builder::{container::ContainerSpecBuilder, executor::DockerExecutorBuilder, Builder};
//! use unikboot::runner::ContainerRunner;
//!
//! let executor = DockerExecutorBuilder::auto().unwrap().try_build().unwrap();
//! let spec = ContainerSpecBuilder::new()
//!     .with_image("alpine".to_string())
//!     .with_args(vec!["true".to_string()])
//!     .try_build()
//!     .unwrap();
//! ContainerRunner::new(executor).run(spec).await.unwrap();
//! ```

use std::panic::{resume_unwind, AssertUnwindSafe};

use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};
use unikboot_models::models::ContainerSpec;

use crate::executor::{ContainerRuntime, ExecuteError, LogsOptions};

#[derive(Debug)]
pub struct ContainerRunner<R> {
    runtime: R,
}

impl<R: ContainerRuntime> ContainerRunner<R> {
    pub fn new(runtime: R) -> ContainerRunner<R> {
        ContainerRunner { runtime }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Run one container and block until it exits.
    ///
    /// Once the container exists, its removal is attempted whatever happens
    /// next, a panic in the runtime included: the container is removed, then
    /// the panic resumes. Removal failures are logged, never returned.
    ///
    /// Dropping the returned future between create and remove skips the
    /// removal and leaves the container behind.
    #[instrument(skip_all, fields(image = %spec.image))]
    pub async fn run(&self, spec: ContainerSpec) -> Result<(), ExecuteError> {
        let id = match self.runtime.create_container(&spec).await {
            Ok(id) => id,
            Err(e) => {
                error!(err = %e, "Error creating container");
                return Err(e);
            }
        };
        info!(id = %id, "Created container");

        let result = AssertUnwindSafe(self.start_and_wait(&id))
            .catch_unwind()
            .await;

        self.remove(&id).await;
        match result {
            Ok(result) => result,
            Err(panic) => resume_unwind(panic),
        }
    }

    async fn remove(&self, id: &str) {
        match self.runtime.remove_container(id).await {
            Ok(()) => debug!(id = %id, "Removed container"),
            Err(e) => warn!(id = %id, err = %e, "Could not remove container"),
        }
    }

    async fn start_and_wait(&self, id: &str) -> Result<(), ExecuteError> {
        if let Err(e) = self.runtime.start_container(id).await {
            error!(id = %id, err = %e, "Error starting container");
            return Err(e);
        }

        let status = self.runtime.wait_container(id).await?;
        if status != 0 {
            error!(id = %id, status, "Container exit status non zero");
            match self
                .runtime
                .container_logs(id, &LogsOptions::combined())
                .await
            {
                Ok(logs) => error!(id = %id, "Container output:\n{}", logs),
                Err(e) => warn!(id = %id, err = %e, "Failed to get container logs"),
            }
            return Err(ExecuteError::NonZeroExit);
        }

        debug!(id = %id, "Container exited successfully");
        Ok(())
    }
}
