/// Blk : Block device the unikernel mounts at boot.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Blk {
    /// Where the device comes from, `dev` for a disk, `etfs` for a host file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Device path as seen by the guest, e.g. `/dev/ld0a`
    pub path: String,
    /// File system type, e.g. `blk` or `ext2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fstype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
}

impl Blk {
    pub fn new(path: String) -> Blk {
        Blk {
            source: None,
            path,
            fstype: None,
            mountpoint: None,
        }
    }
}
