//! Error types for the vector index
//!
//! Splits failures into two categories:
//! - Synchronous rejections (malformed documents, dimension mismatch)
//! - Retryable backend failures (network/storage)

use crate::document::DocumentId;

/// Vector store errors
#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    /// Required metadata field missing or empty; rejected before any write
    #[error("missing required metadata field: {0}")]
    MissingMetadata(String),

    /// Document carries no embedding
    #[error("document {0} has an empty embedding")]
    EmptyEmbedding(DocumentId),

    /// Query/document embedding dimensions disagree
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Referenced document does not exist
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// Backend (network/storage) failure
    #[error("vector store backend error: {0}")]
    Backend(String),
}

impl VectorStoreError {
    /// Whether the caller may retry the operation
    ///
    /// Only backend failures are retryable; validation rejections are not.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_are_retryable() {
        assert!(VectorStoreError::Backend("connection reset".to_string()).is_retryable());
        assert!(!VectorStoreError::MissingMetadata("date".to_string()).is_retryable());
        assert!(!VectorStoreError::NotFound(DocumentId::new()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = VectorStoreError::DimensionMismatch {
            expected: 8,
            got: 4,
        };
        assert!(err.to_string().contains("expected 8"));
    }
}
