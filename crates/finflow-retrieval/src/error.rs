//! Error types for retrieval and ingestion

use finflow_vector::VectorStoreError;

/// Retrieval/ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Embedding provider failed
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Embedding batch came back with the wrong cardinality
    #[error("embedding batch size mismatch: sent {sent}, got {got}")]
    BatchSizeMismatch { sent: usize, got: usize },

    /// Index read/write failed
    #[error("vector store error: {0}")]
    Store(#[from] VectorStoreError),

    /// A document feed failed to produce its corpus
    #[error("document feed '{feed}' failed: {message}")]
    Feed { feed: String, message: String },
}

impl RetrievalError {
    /// Whether the caller may retry the operation
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Embedding(_) | Self::Feed { .. } => true,
            Self::BatchSizeMismatch { .. } => false,
        }
    }
}
