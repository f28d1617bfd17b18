//! Indexed document types
//!
//! Defines the unit of storage for the index:
//! - Document identity (ULID for sortability)
//! - Required metadata (source, date, type)
//! - Content plus its embedding vector

use crate::error::VectorStoreError;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique document identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Ulid);

impl DocumentId {
    /// Generate new document ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Required metadata attached to every indexed document
///
/// `doc_type` is the free-form category used for filtered retrieval
/// (e.g. `market_news`, `regulatory`, `historical_pattern`, `company_info`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Where the content came from
    pub source: String,
    /// Publication date, `YYYYMMDD`
    pub date: String,
    /// Category used for filtered retrieval
    #[serde(rename = "type")]
    pub doc_type: String,
}

impl DocumentMetadata {
    /// Create new metadata
    #[inline]
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        date: impl Into<String>,
        doc_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            date: date.into(),
            doc_type: doc_type.into(),
        }
    }

    /// Look up a metadata field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "source" => Some(&self.source),
            "date" => Some(&self.date),
            "type" => Some(&self.doc_type),
            _ => None,
        }
    }

    /// Validate that all required fields are present
    ///
    /// # Errors
    /// - `VectorStoreError::MissingMetadata` naming the first empty field
    pub fn validate(&self) -> Result<(), VectorStoreError> {
        for (name, value) in [
            ("source", &self.source),
            ("date", &self.date),
            ("type", &self.doc_type),
        ] {
            if value.trim().is_empty() {
                return Err(VectorStoreError::MissingMetadata(name.to_string()));
            }
        }
        Ok(())
    }
}

/// A document stored in the index: content, embedding, metadata
///
/// Immutable after ingestion except through explicit
/// [`VectorStore::update`](crate::store::VectorStore::update) /
/// [`VectorStore::delete`](crate::store::VectorStore::delete) calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Document ID
    pub id: DocumentId,
    /// Text payload
    pub content: String,
    /// Fixed-length embedding vector
    pub embedding: Vec<f32>,
    /// Required metadata
    pub metadata: DocumentMetadata,
}

impl IndexedDocument {
    /// Create new document with a generated ID
    #[inline]
    #[must_use]
    pub fn new(
        content: impl Into<String>,
        embedding: Vec<f32>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            content: content.into(),
            embedding,
            metadata,
        }
    }

    /// Validate the document before any write
    ///
    /// # Errors
    /// - `VectorStoreError::MissingMetadata` on an empty required field
    /// - `VectorStoreError::EmptyEmbedding` on a zero-length vector
    pub fn validate(&self) -> Result<(), VectorStoreError> {
        self.metadata.validate()?;
        if self.embedding.is_empty() {
            return Err(VectorStoreError::EmptyEmbedding(self.id));
        }
        Ok(())
    }
}
