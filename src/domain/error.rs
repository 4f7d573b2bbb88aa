use thiserror::Error;

/// Domain-level errors for Arogya.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network request blocked: {reason}")]
    NetworkBlocked { reason: String },

    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("No input provided.")]
    NoInputProvided,

    #[error("Could not extract text from inputs.")]
    EmptyExtractionResult,

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Document text extraction error: {0}")]
    Ocr(String),

    #[error("Entity tagging error: {0}")]
    Tagging(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Whisper error: {0}")]
    Whisper(String),
}

impl DomainError {
    /// Whether the failure was caused by the caller's input rather than by the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::NoInputProvided | DomainError::EmptyExtractionResult
        )
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
