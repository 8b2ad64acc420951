/// Net : Network interface configuration of the unikernel.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Net {
    /// Interface name inside the guest, e.g. `vioif0`
    #[serde(rename = "if")]
    pub iface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloner: Option<String>,
    /// Address family, `inet` or `inet6`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// `dhcp` or `static`
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw: Option<String>,
}
