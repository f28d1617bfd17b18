//! Vector store seam
//!
//! The index backend is pluggable: the pipeline only sees this trait.
//! Contract highlights:
//! - `insert` is all-or-nothing: every document is validated before any write
//! - `search` returns ascending cosine distance, honoring limit, conjunctive
//!   metadata filters, and an optional distance threshold together

use crate::document::{DocumentId, IndexedDocument};
use crate::error::VectorStoreError;
use serde::{Deserialize, Serialize};

/// Conjunction of metadata equality constraints
///
/// Every constraint must hold (`AND`); there is no `OR`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    /// `field == value` tests, all of which must pass
    pub equals: Vec<(String, String)>,
}

impl MetadataFilter {
    /// Empty filter (matches everything)
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Add an equality constraint
    #[must_use]
    pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Whether a document satisfies every constraint
    ///
    /// A document lacking a filtered field never matches.
    #[must_use]
    pub fn matches(&self, doc: &IndexedDocument) -> bool {
        self.equals
            .iter()
            .all(|(field, value)| doc.metadata.field(field) == Some(value.as_str()))
    }
}

/// Nearest-neighbor query
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Query embedding
    pub vector: Vec<f32>,
    /// Maximum number of hits
    pub limit: usize,
    /// Metadata constraints on the candidate set
    pub filter: MetadataFilter,
    /// Hits at or beyond this cosine distance are excluded
    pub distance_threshold: Option<f32>,
}

impl SearchQuery {
    /// Create a query with a limit and no constraints
    #[inline]
    #[must_use]
    pub fn new(vector: Vec<f32>, limit: usize) -> Self {
        Self {
            vector,
            limit,
            filter: MetadataFilter::none(),
            distance_threshold: None,
        }
    }

    /// With metadata filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = filter;
        self
    }

    /// With distance threshold
    #[inline]
    #[must_use]
    pub fn with_distance_threshold(mut self, threshold: f32) -> Self {
        self.distance_threshold = Some(threshold);
        self
    }
}

/// A search result: document plus its cosine distance from the query
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Matching document
    pub document: IndexedDocument,
    /// Cosine distance to the query vector (lower is closer)
    pub distance: f32,
}

/// Fields that may be patched on a stored document
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    /// Replace the text payload
    pub content: Option<String>,
    /// Replace the embedding
    pub embedding: Option<Vec<f32>>,
    /// Replace the metadata
    pub metadata: Option<crate::document::DocumentMetadata>,
}

/// Similarity-search index over [`IndexedDocument`]s
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a batch of documents
    ///
    /// All-or-nothing: if any document fails validation, nothing is written.
    ///
    /// # Errors
    /// - `VectorStoreError::MissingMetadata` / `EmptyEmbedding` on the first
    ///   malformed document, before any write
    /// - `VectorStoreError::Backend` on storage failure (retryable)
    async fn insert(&self, documents: Vec<IndexedDocument>) -> Result<(), VectorStoreError>;

    /// Nearest-neighbor search, ascending cosine distance
    ///
    /// Returns at most `query.limit` hits; fewer if the filtered candidate
    /// set is smaller or the distance threshold cuts it off.
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchHit>, VectorStoreError>;

    /// Delete documents by ID (missing IDs are ignored)
    async fn delete(&self, ids: Vec<DocumentId>) -> Result<(), VectorStoreError>;

    /// Patch fields on a stored document
    ///
    /// # Errors
    /// - `VectorStoreError::NotFound` if the document does not exist
    async fn update(&self, id: DocumentId, update: DocumentUpdate)
        -> Result<(), VectorStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;

    fn doc(doc_type: &str) -> IndexedDocument {
        IndexedDocument::new(
            "content",
            vec![1.0, 0.0],
            DocumentMetadata::new("src", "20240101", doc_type),
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(MetadataFilter::none().matches(&doc("market_news")));
    }

    #[test]
    fn filter_is_a_conjunction() {
        let filter = MetadataFilter::none()
            .with_equals("type", "regulatory")
            .with_equals("source", "src");
        assert!(filter.matches(&doc("regulatory")));
        assert!(!filter.matches(&doc("market_news")));
    }

    #[test]
    fn filter_on_unknown_field_never_matches() {
        let filter = MetadataFilter::none().with_equals("ticker", "ACME");
        assert!(!filter.matches(&doc("market_news")));
    }
}
