use unikboot_models::models::Blk;

use crate::builder::{assert_not_none, Builder, BuilderError};

#[derive(Debug)]
pub struct BlkBuilder {
    pub source: Option<String>,
    pub path: Option<String>,
    pub fstype: Option<String>,
    pub mountpoint: Option<String>,
}

impl Default for BlkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlkBuilder {
    pub fn new() -> BlkBuilder {
        BlkBuilder {
            source: None,
            path: None,
            fstype: None,
            mountpoint: None,
        }
    }

    pub fn with_source(mut self, source: String) -> BlkBuilder {
        self.source = Some(source);
        self
    }

    pub fn with_path(mut self, path: String) -> BlkBuilder {
        self.path = Some(path);
        self
    }

    pub fn with_fstype(mut self, fstype: String) -> BlkBuilder {
        self.fstype = Some(fstype);
        self
    }

    pub fn with_mountpoint(mut self, mountpoint: String) -> BlkBuilder {
        self.mountpoint = Some(mountpoint);
        self
    }
}

impl Builder<Blk> for BlkBuilder {
    fn try_build(self) -> Result<Blk, BuilderError> {
        assert_not_none(stringify!(self.path), &self.path)?;
        if let Some(mountpoint) = &self.mountpoint {
            if !mountpoint.starts_with('/') {
                return Err(BuilderError::InvalidValue(
                    stringify!(self.mountpoint).to_string(),
                    format!("{} is not an absolute path", mountpoint),
                ));
            }
        }
        Ok(Blk {
            source: self.source,
            path: self.path.unwrap(),
            fstype: self.fstype,
            mountpoint: self.mountpoint,
        })
    }
}
