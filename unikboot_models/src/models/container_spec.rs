/// ContainerSpec : Body of a container creation request. Only the fields the
/// boot-creator workflow needs are modeled; the engine fills in the rest.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
    /// Name of the image the container is created from
    pub image: String,
    /// Arguments given to the image entrypoint, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,
    pub host_config: HostConfig,
}

impl ContainerSpec {
    pub fn new(image: String) -> ContainerSpec {
        ContainerSpec {
            image,
            cmd: Vec::new(),
            host_config: HostConfig::default(),
        }
    }
}

/// HostConfig : Host side settings of the container.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    /// Bind mounts, each one formatted as `hostPath:containerPath`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binds: Vec<String>,
    /// Gives the container access to host devices (loop and block devices)
    #[serde(default)]
    pub privileged: bool,
}
