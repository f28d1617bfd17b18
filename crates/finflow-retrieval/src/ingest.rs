//! Corpus ingestion
//!
//! Batch-loads per-subject corpora into the index:
//! - A [`DocumentFeed`] produces raw documents for a subject
//!   (market news, regulatory filings, historical patterns, company info)
//! - The [`Ingestor`] chunks them, embeds the chunks in one batch, and
//!   inserts the whole batch into the vector store

use crate::chunker::Chunker;
use crate::embedder::Embedder;
use crate::error::RetrievalError;
use finflow_vector::{DocumentMetadata, IndexedDocument, VectorStore};
use std::sync::Arc;

/// A document as produced by a feed, before chunking/embedding
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Full text payload
    pub text: String,
    /// Where the content came from
    pub source: String,
    /// Publication date, `YYYYMMDD`
    pub date: String,
    /// Retrieval category
    pub doc_type: String,
}

impl RawDocument {
    /// Create a raw document
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        source: impl Into<String>,
        date: impl Into<String>,
        doc_type: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            date: date.into(),
            doc_type: doc_type.into(),
        }
    }
}

/// Produces the raw corpus for one subject
///
/// Implementations wrap upstream data providers (news APIs, filings,
/// historical data). A feed failure is retryable.
#[async_trait::async_trait]
pub trait DocumentFeed: Send + Sync {
    /// Feed name, used in error tagging and logs
    fn name(&self) -> &str;

    /// Fetch the corpus for `subject`
    async fn fetch(&self, subject: &str) -> Result<Vec<RawDocument>, RetrievalError>;
}

/// Chunk, embed, and insert feed output into the vector store
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: Chunker,
}

impl Ingestor {
    /// Create an ingestor with the default chunking policy
    #[inline]
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            chunker: Chunker::default(),
        }
    }

    /// With a custom chunker
    #[inline]
    #[must_use]
    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest raw documents: chunk, embed as one batch, insert as one batch
    ///
    /// Returns the number of chunks written.
    pub async fn ingest(&self, documents: Vec<RawDocument>) -> Result<usize, RetrievalError> {
        let mut texts = Vec::new();
        let mut metadatas = Vec::new();
        for doc in &documents {
            for chunk in self.chunker.split(&doc.text) {
                texts.push(chunk);
                metadatas.push(DocumentMetadata::new(&doc.source, &doc.date, &doc.doc_type));
            }
        }
        if texts.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RetrievalError::BatchSizeMismatch {
                sent: texts.len(),
                got: embeddings.len(),
            });
        }

        let indexed: Vec<IndexedDocument> = texts
            .into_iter()
            .zip(embeddings)
            .zip(metadatas)
            .map(|((content, embedding), metadata)| {
                IndexedDocument::new(content, embedding, metadata)
            })
            .collect();

        let count = indexed.len();
        self.store.insert(indexed).await?;
        tracing::info!(chunks = count, "ingested corpus batch");
        Ok(count)
    }

    /// Fetch every feed for `subject` and ingest the combined corpus
    ///
    /// A failing feed aborts the ingest; nothing is written.
    pub async fn populate(
        &self,
        subject: &str,
        feeds: &[Arc<dyn DocumentFeed>],
    ) -> Result<usize, RetrievalError> {
        let mut documents = Vec::new();
        for feed in feeds {
            tracing::info!(feed = feed.name(), subject, "fetching feed");
            documents.extend(feed.fetch(subject).await?);
        }
        self.ingest(documents).await
    }
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("chunker", &self.chunker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finflow_vector::{MemoryVectorStore, SearchQuery};

    struct ConstEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ConstEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Ok(vec![1.0, 0.0])
        }
    }

    struct OneDocFeed;

    #[async_trait::async_trait]
    impl DocumentFeed for OneDocFeed {
        fn name(&self) -> &str {
            "one_doc"
        }

        async fn fetch(&self, subject: &str) -> Result<Vec<RawDocument>, RetrievalError> {
            Ok(vec![RawDocument::new(
                format!("{subject} had a strong quarter"),
                "Test Feed",
                "20240301",
                "market_news",
            )])
        }
    }

    #[tokio::test]
    async fn ingest_writes_chunks_with_metadata() {
        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(Arc::new(ConstEmbedder), store.clone())
            .with_chunker(Chunker::new(20, 5));

        let written = ingestor
            .ingest(vec![RawDocument::new(
                "alpha beta gamma delta epsilon zeta eta theta",
                "Test Feed",
                "20240301",
                "historical_pattern",
            )])
            .await
            .unwrap();

        assert!(written > 1);
        assert_eq!(store.len(), written);

        let hits = store
            .search(SearchQuery::new(vec![1.0, 0.0], 50))
            .await
            .unwrap();
        assert!(hits
            .iter()
            .all(|h| h.document.metadata.doc_type == "historical_pattern"));
    }

    #[tokio::test]
    async fn ingest_of_nothing_is_a_noop() {
        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(Arc::new(ConstEmbedder), store.clone());
        assert_eq!(ingestor.ingest(vec![]).await.unwrap(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn populate_combines_feeds() {
        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(Arc::new(ConstEmbedder), store.clone());

        let feeds: Vec<Arc<dyn DocumentFeed>> = vec![Arc::new(OneDocFeed), Arc::new(OneDocFeed)];
        let written = ingestor.populate("ACME", &feeds).await.unwrap();
        assert_eq!(written, 2);
    }
}
