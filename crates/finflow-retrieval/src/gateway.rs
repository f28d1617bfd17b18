//! Retrieval gateway
//!
//! Turns a free-text query into an embedding, runs a filtered
//! nearest-neighbor search, and renders the hits into the context block the
//! stage prompts embed. The rendering is load-bearing: stage prompts were
//! tuned against this exact layout.

use crate::embedder::Embedder;
use crate::error::RetrievalError;
use finflow_vector::{IndexedDocument, MetadataFilter, SearchQuery, VectorStore};
use std::sync::Arc;

/// Result cap applied to every retrieval
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Retrieval gateway over an embedder and a vector store
#[derive(Clone)]
pub struct RetrievalGateway {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    limit: usize,
}

impl RetrievalGateway {
    /// Create a gateway with the default result cap
    #[inline]
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// With a custom result cap
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Retrieve the documents most relevant to `query_text`
    ///
    /// When `context_type` is given, the candidate set is restricted to
    /// documents whose `type` metadata equals it. Results keep the order the
    /// index returned them in (ascending distance).
    pub async fn retrieve(
        &self,
        query_text: &str,
        context_type: Option<&str>,
    ) -> Result<Vec<IndexedDocument>, RetrievalError> {
        let vector = self.embedder.embed(query_text).await?;

        let filter = match context_type {
            Some(doc_type) => MetadataFilter::none().with_equals("type", doc_type),
            None => MetadataFilter::none(),
        };

        let hits = self
            .store
            .search(SearchQuery::new(vector, self.limit).with_filter(filter))
            .await?;

        tracing::debug!(
            query = query_text,
            context_type,
            hits = hits.len(),
            "retrieved context"
        );
        Ok(hits.into_iter().map(|hit| hit.document).collect())
    }
}

impl std::fmt::Debug for RetrievalGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalGateway")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

/// Render retrieved documents into the prompt-ready context block
///
/// Pure transformation; downstream stage prompts depend on this exact
/// layout, do not reorder or reformat the fields.
#[must_use]
pub fn format_context(docs: &[IndexedDocument]) -> String {
    let mut context = String::from("Relevant Context:\n\n");
    for (i, doc) in docs.iter().enumerate() {
        context.push_str(&format!("Context {}:\n", i + 1));
        context.push_str(&format!("Source: {}\n", doc.metadata.source));
        context.push_str(&format!("Date: {}\n", doc.metadata.date));
        context.push_str(&format!("Type: {}\n", doc.metadata.doc_type));
        context.push_str(&format!("Content: {}\n\n", doc.content));
    }
    context
}
