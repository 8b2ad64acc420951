use std::path::Path;

use unikboot_models::models::{ContainerSpec, HostConfig};

use super::{assert_not_none, Builder, BuilderError};

/// Describe a one-shot container: image, arguments, bind mounts and
/// privileges. The container gets no name and no network settings.
#[derive(Debug, Default)]
pub struct ContainerSpecBuilder {
    image: Option<String>,
    args: Vec<String>,
    binds: Vec<String>,
    privileged: bool,
}

impl ContainerSpecBuilder {
    pub fn new() -> ContainerSpecBuilder {
        ContainerSpecBuilder::default()
    }

    pub fn with_image(mut self, image: String) -> ContainerSpecBuilder {
        self.image = Some(image);
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> ContainerSpecBuilder {
        self.args.extend(args);
        self
    }

    /// Expose `host_path` at `container_path` inside the container
    pub fn with_bind<P: AsRef<Path>>(
        mut self,
        host_path: P,
        container_path: &str,
    ) -> ContainerSpecBuilder {
        self.binds.push(format!(
            "{}:{}",
            host_path.as_ref().display(),
            container_path
        ));
        self
    }

    pub fn as_privileged(mut self) -> ContainerSpecBuilder {
        self.privileged = true;
        self
    }
}

impl Builder<ContainerSpec> for ContainerSpecBuilder {
    fn try_build(self) -> Result<ContainerSpec, BuilderError> {
        assert_not_none(stringify!(self.image), &self.image)?;
        let image = self.image.unwrap();
        if image.trim().is_empty() {
            return Err(BuilderError::InvalidValue(
                stringify!(self.image).to_string(),
                "image name is empty".to_string(),
            ));
        }
        Ok(ContainerSpec {
            image,
            cmd: self.args,
            host_config: HostConfig {
                binds: self.binds,
                privileged: self.privileged,
            },
        })
    }
}
