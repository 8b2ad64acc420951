/// ErrorResponse : Body the engine sends along with a non-success status.

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
