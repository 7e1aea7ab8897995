use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path is not under notes root: {0}")]
    OutsideRoot(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown embedding model: {0}")]
    UnknownEmbeddingModel(String),

    #[error(
        "index was built with embedding model {indexed} but queries use {requested}; reindex required"
    )]
    EmbeddingModelMismatch { indexed: String, requested: String },

    #[error("embedding dimension {actual} != {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from {provider}: {details}")]
    ProviderResponse { provider: String, details: String },
}

impl LlmError {
    /// Whether the failure came from local configuration rather than the provider.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingSetting(_))
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("generation failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    StaleIndex(String),

    #[error("{0}")]
    Internal(String),
}

impl From<IndexError> for ServiceError {
    fn from(value: IndexError) -> Self {
        match value {
            IndexError::EmbeddingModelMismatch { .. } => ServiceError::StaleIndex(value.to_string()),
            IndexError::UnknownEmbeddingModel(_) => ServiceError::Configuration(value.to_string()),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<LlmError> for ServiceError {
    fn from(value: LlmError) -> Self {
        if value.is_configuration() {
            ServiceError::Configuration(value.to_string())
        } else {
            ServiceError::Upstream(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
