use std::{env::var_os, path::PathBuf};

use crate::{
    builder::{Builder, BuilderError},
    executor::{DockerExecutor, DEFAULT_API_VERSION},
};

use super::assert_not_none;

/// Socket the Docker daemon listens on when nothing else is configured
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

const UNIX_SCHEME: &str = "unix://";

#[derive(Debug, Default)]
pub struct DockerExecutorBuilder {
    socket: Option<PathBuf>,
    api_version: Option<String>,
}

impl DockerExecutorBuilder {
    pub fn new() -> DockerExecutorBuilder {
        DockerExecutorBuilder {
            socket: None,
            api_version: None,
        }
    }

    /// Tries to read the engine socket from the `DOCKER_HOST` variable. Only
    /// `unix://` addresses can be used, any other scheme is an error.
    fn find_socket_from_env() -> Result<Option<PathBuf>, BuilderError> {
        let host = match var_os("DOCKER_HOST") {
            Some(host) if !host.is_empty() => host,
            _ => return Ok(None),
        };
        let host = host.to_string_lossy().into_owned();
        let path = host.strip_prefix(UNIX_SCHEME).ok_or_else(|| {
            BuilderError::InvalidValue(
                "DOCKER_HOST".to_string(),
                format!("{} is not a unix socket address", host),
            )
        })?;
        let path = PathBuf::from(path);
        if !path.exists() {
            log::warn!("DOCKER_HOST is set but the socket does not exist: {:?}", path);
        }
        Ok(Some(path))
    }

    /// Tries to determine where the engine socket is (top to bottom priority).
    ///
    /// - `DOCKER_HOST` environment variable, `unix://` scheme only
    /// - [DEFAULT_DOCKER_SOCKET]
    pub fn determine_socket_location() -> Result<PathBuf, BuilderError> {
        let socket = Self::find_socket_from_env()?;
        Ok(socket.unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKER_SOCKET)))
    }

    /// Create a builder with the socket location taken from the environment,
    /// see [DockerExecutorBuilder::determine_socket_location].
    pub fn auto() -> Result<DockerExecutorBuilder, BuilderError> {
        let socket = Self::determine_socket_location()?;
        Ok(Self::new().with_socket_path(socket))
    }

    pub fn with_socket_path(mut self, socket: PathBuf) -> DockerExecutorBuilder {
        self.socket = Some(socket);
        self
    }

    /// Engine API version, with or without the `v` prefix (`1.41`, `v1.41`)
    pub fn with_api_version(mut self, api_version: String) -> DockerExecutorBuilder {
        self.api_version = Some(api_version);
        self
    }
}

impl Builder<DockerExecutor> for DockerExecutorBuilder {
    fn try_build(self) -> Result<DockerExecutor, BuilderError> {
        assert_not_none(stringify!(self.socket), &self.socket)?;
        let api_version = match self.api_version {
            Some(version) => version.trim_start_matches('v').to_string(),
            None => DEFAULT_API_VERSION.to_string(),
        };
        let well_formed = api_version
            .split_once('.')
            .map(|(major, minor)| {
                !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(false);
        if !well_formed {
            return Err(BuilderError::InvalidValue(
                stringify!(self.api_version).to_string(),
                format!("{} is not a valid engine API version", api_version),
            ));
        }
        Ok(DockerExecutor::new(self.socket.unwrap(), api_version))
    }
}
