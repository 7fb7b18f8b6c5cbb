use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown service '{0}'")]
    UnknownService(String),

    #[error("No images provided")]
    NoImages,

    /// `index` is zero-based.
    #[error("Failed to decode image {index}: {reason}")]
    ImageDecode { index: usize, reason: String },

    #[error("LLM response is not a valid JSON object: {reason}")]
    InvalidModelResponse { raw: String, reason: String },

    #[error("{0}")]
    ExternalServiceError(String),

    #[error("Internal server error")]
    InternalServerError,
}
