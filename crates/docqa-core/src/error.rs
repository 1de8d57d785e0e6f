//! Error types for docqa

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the docqa system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("Unsupported embedding provider: {0}")]
    UnsupportedEmbeddingProvider(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("No documents have been indexed yet")]
    NotIndexed,

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Document loader error: {0}")]
    DocumentLoader(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether the error was caused by the caller rather than by an upstream
    /// provider or the local machine.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedProvider(_)
                | Error::UnsupportedEmbeddingProvider(_)
                | Error::InvalidInput(_)
                | Error::NotIndexed
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
