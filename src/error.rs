//! Error types shared by the chat server and the ingestion run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid credential / setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// PDF could not be read or parsed
    #[error("Document error: {0}")]
    Document(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Failures coming back from one of the external services.
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            AppError::Llm(_)
                | AppError::Embedding(_)
                | AppError::VectorStore(_)
                | AppError::DimensionMismatch { .. }
        )
    }
}

impl From<qdrant_client::QdrantError> for AppError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        AppError::VectorStore(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
