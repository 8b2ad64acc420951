use serde_json::{Map, Value};

use super::{Blk, Net, RunCommand};

/// RumpConfig : Boot configuration read by a rump kernel unikernel.
///
/// Plain serde serialization emits `blk` as an array. The unikernel expects
/// one `blk` key per device instead, so use the rump encoder of the `unikboot`
/// crate to produce the text handed to the kernel.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RumpConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rc: Vec<RunCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<Net>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blk: Vec<Blk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Any other top level key understood by the unikernel. Keys listed in
    /// [RumpConfig::TYPED_KEYS] belong to the typed fields and must not be
    /// set here; the rump encoder drops them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RumpConfig {
    /// Top level keys backed by a typed field
    pub const TYPED_KEYS: [&'static str; 4] = ["rc", "net", "blk", "hostname"];
}
