use thiserror::Error;

#[derive(Debug, Error)]
pub enum CostingError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown input format: {0}")]
    UnknownFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CostingError {
    fn from(e: serde_json::Error) -> Self {
        CostingError::SerializationError(e.to_string())
    }
}
