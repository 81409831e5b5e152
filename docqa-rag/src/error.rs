//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval and answering operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding backend failed or returned an unusable response.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The chat-completion backend failed or returned an unusable response.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
