//! Embedding model seam

use crate::error::RetrievalError;

/// Turns text into fixed-length embedding vectors
///
/// Implementations call out to an embedding provider; all vectors returned
/// by one embedder must share a dimension.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;

    /// Embed a batch of texts, preserving order
    ///
    /// The default implementation embeds one at a time; providers with a
    /// batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}
