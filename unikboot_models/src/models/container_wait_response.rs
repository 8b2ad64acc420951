/// ContainerWaitResponse : Returned by the engine when a container stops.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerWaitResponse {
    /// Exit code of the container
    pub status_code: i64,
    #[serde(default)]
    pub error: Option<WaitExitError>,
}

/// WaitExitError : Reported when the engine could not wait for the container.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WaitExitError {
    #[serde(default)]
    pub message: Option<String>,
}
