//! In-memory vector store backend
//!
//! Brute-force scan over a concurrent map. The production backend is a
//! managed document store behind the same trait; this one backs tests and
//! the demo binary.

use crate::distance::cosine_distance;
use crate::document::{DocumentId, IndexedDocument};
use crate::error::VectorStoreError;
use crate::store::{DocumentUpdate, SearchHit, SearchQuery, VectorStore};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory [`VectorStore`] implementation
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    documents: DashMap<DocumentId, IndexedDocument>,
    /// Embedding dimension, fixed by the first insert (0 = unset)
    dimension: AtomicUsize,
}

impl MemoryVectorStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn check_dimension(&self, len: usize) -> Result<(), VectorStoreError> {
        let expected = self.dimension.load(Ordering::Acquire);
        if expected != 0 && expected != len {
            return Err(VectorStoreError::DimensionMismatch { expected, got: len });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert(&self, documents: Vec<IndexedDocument>) -> Result<(), VectorStoreError> {
        // Validate the whole batch before touching the map: a rejection must
        // leave the store untouched.
        for doc in &documents {
            doc.validate()?;
            self.check_dimension(doc.embedding.len())?;
        }
        if let Some(first) = documents.first() {
            self.dimension
                .compare_exchange(
                    0,
                    first.embedding.len(),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .ok();
        }

        let count = documents.len();
        for doc in documents {
            self.documents.insert(doc.id, doc);
        }
        tracing::debug!(count, total = self.documents.len(), "inserted batch");
        Ok(())
    }

    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchHit>, VectorStoreError> {
        self.check_dimension(query.vector.len())?;

        let mut hits: Vec<SearchHit> = self
            .documents
            .iter()
            .filter(|entry| query.filter.matches(entry.value()))
            .map(|entry| SearchHit {
                distance: cosine_distance(&query.vector, &entry.value().embedding),
                document: entry.value().clone(),
            })
            .filter(|hit| match query.distance_threshold {
                Some(threshold) => hit.distance < threshold,
                None => true,
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.document.id.cmp(&a.document.id))
        });
        hits.truncate(query.limit);
        Ok(hits)
    }

    async fn delete(&self, ids: Vec<DocumentId>) -> Result<(), VectorStoreError> {
        for id in ids {
            self.documents.remove(&id);
        }
        Ok(())
    }

    async fn update(
        &self,
        id: DocumentId,
        update: DocumentUpdate,
    ) -> Result<(), VectorStoreError> {
        if let Some(embedding) = &update.embedding {
            if embedding.is_empty() {
                return Err(VectorStoreError::EmptyEmbedding(id));
            }
            self.check_dimension(embedding.len())?;
        }
        if let Some(metadata) = &update.metadata {
            metadata.validate()?;
        }

        let mut entry = self
            .documents
            .get_mut(&id)
            .ok_or(VectorStoreError::NotFound(id))?;
        if let Some(content) = update.content {
            entry.content = content;
        }
        if let Some(embedding) = update.embedding {
            entry.embedding = embedding;
        }
        if let Some(metadata) = update.metadata {
            entry.metadata = metadata;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;
    use crate::store::MetadataFilter;

    fn doc(content: &str, embedding: Vec<f32>, doc_type: &str) -> IndexedDocument {
        IndexedDocument::new(
            content,
            embedding,
            DocumentMetadata::new("test", "20240301", doc_type),
        )
    }

    #[tokio::test]
    async fn search_returns_closest_first() {
        let store = MemoryVectorStore::new();
        store
            .insert(vec![
                doc("far", vec![0.0, 1.0], "market_news"),
                doc("near", vec![1.0, 0.1], "market_news"),
                doc("exact", vec![1.0, 0.0], "market_news"),
            ])
            .await
            .unwrap();

        let hits = store
            .search(SearchQuery::new(vec![1.0, 0.0], 10))
            .await
            .unwrap();

        let contents: Vec<&str> = hits.iter().map(|h| h.document.content.as_str()).collect();
        assert_eq!(contents, vec!["exact", "near", "far"]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn search_honors_limit_and_threshold_together() {
        let store = MemoryVectorStore::new();
        store
            .insert(vec![
                doc("a", vec![1.0, 0.0], "t"),
                doc("b", vec![0.9, 0.1], "t"),
                doc("c", vec![0.0, 1.0], "t"),
            ])
            .await
            .unwrap();

        let hits = store
            .search(
                SearchQuery::new(vec![1.0, 0.0], 2).with_distance_threshold(0.5),
            )
            .await
            .unwrap();

        // "c" is excluded by the threshold even though the limit allows it.
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.distance < 0.5));
    }

    #[tokio::test]
    async fn threshold_is_exclusive() {
        let store = MemoryVectorStore::new();
        store
            .insert(vec![doc("orthogonal", vec![0.0, 1.0], "t")])
            .await
            .unwrap();

        // Distance is exactly 1.0; a threshold of 1.0 must exclude it.
        let hits = store
            .search(SearchQuery::new(vec![1.0, 0.0], 5).with_distance_threshold(1.0))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn metadata_filter_restricts_candidates_exactly() {
        let store = MemoryVectorStore::new();
        store
            .insert(vec![
                doc("news", vec![1.0, 0.0], "market_news"),
                doc("reg", vec![1.0, 0.0], "regulatory"),
            ])
            .await
            .unwrap();

        let hits = store
            .search(
                SearchQuery::new(vec![1.0, 0.0], 10)
                    .with_filter(MetadataFilter::none().with_equals("type", "regulatory")),
            )
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.metadata.doc_type, "regulatory");
    }

    #[tokio::test]
    async fn insert_is_all_or_nothing() {
        let store = MemoryVectorStore::new();
        let bad = IndexedDocument::new(
            "bad",
            vec![1.0, 0.0],
            DocumentMetadata::new("", "20240301", "t"),
        );
        let result = store
            .insert(vec![doc("good", vec![1.0, 0.0], "t"), bad])
            .await;

        assert!(matches!(result, Err(VectorStoreError::MissingMetadata(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn insert_rejects_mixed_dimensions() {
        let store = MemoryVectorStore::new();
        store
            .insert(vec![doc("a", vec![1.0, 0.0], "t")])
            .await
            .unwrap();

        let result = store.insert(vec![doc("b", vec![1.0, 0.0, 0.0], "t")]).await;
        assert!(matches!(
            result,
            Err(VectorStoreError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        ));
    }

    #[tokio::test]
    async fn delete_and_update() {
        let store = MemoryVectorStore::new();
        let a = doc("a", vec![1.0, 0.0], "t");
        let b = doc("b", vec![0.0, 1.0], "t");
        let (id_a, id_b) = (a.id, b.id);
        store.insert(vec![a, b]).await.unwrap();

        store.delete(vec![id_a]).await.unwrap();
        assert_eq!(store.len(), 1);

        store
            .update(
                id_b,
                DocumentUpdate {
                    content: Some("b2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let hits = store
            .search(SearchQuery::new(vec![0.0, 1.0], 1))
            .await
            .unwrap();
        assert_eq!(hits[0].document.content, "b2");

        let missing = store.update(id_a, DocumentUpdate::default()).await;
        assert!(matches!(missing, Err(VectorStoreError::NotFound(_))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn search_is_sorted_and_bounded(
                embeddings in prop::collection::vec(
                    prop::collection::vec(-1.0f32..1.0, 4),
                    1..24,
                ),
                query in prop::collection::vec(-1.0f32..1.0, 4),
                limit in 1usize..8,
            ) {
                let store = MemoryVectorStore::new();
                let docs: Vec<IndexedDocument> = embeddings
                    .into_iter()
                    .map(|e| doc("d", e, "t"))
                    .collect();

                futures::executor::block_on(async {
                    store.insert(docs).await.unwrap();
                    let hits = store
                        .search(SearchQuery::new(query, limit))
                        .await
                        .unwrap();

                    prop_assert!(hits.len() <= limit);
                    prop_assert!(hits
                        .windows(2)
                        .all(|w| w[0].distance <= w[1].distance));
                    Ok(())
                })?;
            }
        }
    }
}
