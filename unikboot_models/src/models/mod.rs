pub mod blk;
pub use self::blk::Blk;
pub mod container_create_response;
pub use self::container_create_response::ContainerCreateResponse;
pub mod container_spec;
pub use self::container_spec::{ContainerSpec, HostConfig};
pub mod container_wait_response;
pub use self::container_wait_response::{ContainerWaitResponse, WaitExitError};
pub mod error_response;
pub use self::error_response::ErrorResponse;
pub mod net;
pub use self::net::Net;
pub mod rump_config;
pub use self::rump_config::RumpConfig;
pub mod run_command;
pub use self::run_command::RunCommand;
