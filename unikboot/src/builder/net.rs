use unikboot_models::models::Net;

use super::{assert_not_none, Builder, BuilderError};

#[derive(Debug, Default)]
pub struct NetBuilder {
    iface: Option<String>,
    cloner: Option<String>,
    kind: Option<String>,
    method: Option<String>,
    addr: Option<String>,
    mask: Option<String>,
    gw: Option<String>,
}

impl NetBuilder {
    pub fn new() -> NetBuilder {
        NetBuilder::default()
    }

    pub fn with_iface(mut self, iface: String) -> NetBuilder {
        self.iface = Some(iface);
        self
    }

    pub fn with_cloner(mut self, cloner: String) -> NetBuilder {
        self.cloner = Some(cloner);
        self
    }

    pub fn with_kind(mut self, kind: String) -> NetBuilder {
        self.kind = Some(kind);
        self
    }

    pub fn with_method(mut self, method: String) -> NetBuilder {
        self.method = Some(method);
        self
    }

    pub fn with_addr(mut self, addr: String) -> NetBuilder {
        self.addr = Some(addr);
        self
    }

    pub fn with_mask(mut self, mask: String) -> NetBuilder {
        self.mask = Some(mask);
        self
    }

    pub fn with_gw(mut self, gw: String) -> NetBuilder {
        self.gw = Some(gw);
        self
    }
}

impl Builder<Net> for NetBuilder {
    fn try_build(self) -> Result<Net, BuilderError> {
        assert_not_none(stringify!(self.iface), &self.iface)?;
        assert_not_none(stringify!(self.method), &self.method)?;
        // a static setup is useless without an address
        if self.method.as_deref() == Some("static") {
            assert_not_none(stringify!(self.addr), &self.addr)?;
        }
        Ok(Net {
            iface: self.iface.unwrap(),
            cloner: self.cloner,
            kind: self.kind,
            method: self.method.unwrap(),
            addr: self.addr,
            mask: self.mask,
            gw: self.gw,
        })
    }
}
