//! # Builder Pattern
//!
//! Builders make the objects of this crate easier to assemble. All fields are
//! optional on the builder and are validated once you run
//! [`Builder::try_build`]; a successful build can be handed to the runtime or
//! to the rump encoder as is.
//!
//! ## Example
//!
//! ```rust
//! use unikboot::builder::{Builder, RumpConfigBuilder};
//! use unikboot::builder::{blk::BlkBuilder, net::NetBuilder};
//!
//! let data = BlkBuilder::new()
//!     .with_source("dev".to_string())
//!     .with_path("/dev/ld0a".to_string())
//!     .with_fstype("blk".to_string())
//!     .with_mountpoint("/data".to_string())
//!     .try_build()
//!     .unwrap();
//! let net = NetBuilder::new()
//!     .with_iface("vioif0".to_string())
//!     .with_kind("inet".to_string())
//!     .with_method("dhcp".to_string())
//!     .try_build()
//!     .unwrap();
//! let config = RumpConfigBuilder::new()
//!     .with_program(vec!["--port".to_string(), "8080".to_string()])
//!     .with_net(net)
//!     .with_blk(data)
//!     .try_build()
//!     .unwrap();
//! let cmdline = unikboot::rump::to_rump_json(&config).unwrap();
//! assert!(cmdline.contains(r#""blk": {"#));
//! ```
use serde_json::Value;
use unikboot_models::models::{Blk, Net, RumpConfig, RunCommand};

use crate::image::PROGRAM_FILE_NAME;

pub mod blk;
pub mod container;
pub mod executor;
pub mod net;
pub mod run_command;

fn assert_not_none<T>(key: &str, value: &Option<T>) -> Result<(), BuilderError> {
    match value {
        Some(_) => Ok(()),
        None => Err(BuilderError::MissingRequiredField(key.to_string())),
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// The field is required but was not provided in the builder object
    #[error("Missing required field {0}")]
    MissingRequiredField(String),
    /// The field was provided but cannot be used
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Generic trait which all builder components must implement
pub trait Builder<T> {
    /// Validate all the fields from the builder object and apply it to the
    /// final object
    ///
    /// ## Example
    ///
    /// ```rust
    /// use unikboot::builder::Builder;
    /// use unikboot::builder::blk::BlkBuilder;
    ///
    /// BlkBuilder::new()
    ///     .with_path("/dev/ld0a".to_string())
    ///     .try_build()
    ///     .unwrap();
    /// ```
    fn try_build(self) -> Result<T, BuilderError>;
}

/// Assemble the boot configuration of a rump kernel unikernel
#[derive(Debug, Default)]
pub struct RumpConfigBuilder {
    rc: Vec<RunCommand>,
    net: Option<Net>,
    blk: Vec<Blk>,
    hostname: Option<String>,
    extra: serde_json::Map<String, Value>,
}

impl RumpConfigBuilder {
    pub fn new() -> RumpConfigBuilder {
        RumpConfigBuilder::default()
    }

    pub fn with_run_command(mut self, command: RunCommand) -> RumpConfigBuilder {
        self.rc.push(command);
        self
    }

    /// Run the program staged by the image builder with the given arguments
    pub fn with_program(self, args: Vec<String>) -> RumpConfigBuilder {
        let mut argv = vec![PROGRAM_FILE_NAME.to_string()];
        argv.extend(args);
        self.with_run_command(RunCommand {
            bin: PROGRAM_FILE_NAME.to_string(),
            argv,
            runmode: None,
        })
    }

    pub fn with_net(mut self, net: Net) -> RumpConfigBuilder {
        self.net = Some(net);
        self
    }

    pub fn with_blk(mut self, blk: Blk) -> RumpConfigBuilder {
        self.blk.push(blk);
        self
    }

    pub fn with_hostname(mut self, hostname: String) -> RumpConfigBuilder {
        self.hostname = Some(hostname);
        self
    }

    /// Set any other top level key
    pub fn with_field(mut self, key: String, value: Value) -> RumpConfigBuilder {
        self.extra.insert(key, value);
        self
    }
}

impl Builder<RumpConfig> for RumpConfigBuilder {
    fn try_build(self) -> Result<RumpConfig, BuilderError> {
        let typed = |k: &&String| RumpConfig::TYPED_KEYS.contains(&k.as_str());
        if let Some(key) = self.extra.keys().find(typed) {
            return Err(BuilderError::InvalidValue(
                key.clone(),
                "use the dedicated builder method".to_string(),
            ));
        }
        Ok(RumpConfig {
            rc: self.rc,
            net: self.net,
            blk: self.blk,
            hostname: self.hostname,
            extra: self.extra,
        })
    }
}
