/// RunCommand : One program the unikernel runs once booted.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RunCommand {
    /// Binary name, as baked into the image
    pub bin: String,
    /// Full argument vector, `argv[0]` included
    #[serde(default)]
    pub argv: Vec<String>,
    /// Run mode: `&` runs in background, `|` pipes into the next command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runmode: Option<String>,
}
