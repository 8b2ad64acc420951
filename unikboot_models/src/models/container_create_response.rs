/// ContainerCreateResponse : Returned by the engine once a container is created.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerCreateResponse {
    /// The ID of the created container
    pub id: String,
    /// Warnings encountered when creating the container
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}
