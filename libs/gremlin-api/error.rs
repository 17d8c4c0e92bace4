use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The response carried no data where a list was expected
    #[error("Data is missing")]
    MissingData,

    /// The response data had an unexpected shape
    #[error("Unexpected data: expected {expected}, got {got}")]
    UnexpectedShape { expected: &'static str, got: String },

    /// A value could not be cast to the requested type
    #[error("Unable to cast {value} to {target}")]
    Conversion { value: String, target: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed request or response frame
    #[error("Invalid frame: {0}")]
    Frame(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
