//! Finflow Retrieval - context retrieval and ingestion
//!
//! Sits between the analysis pipeline and the vector index:
//! - Embeds free-text queries and runs filtered nearest-neighbor search
//! - Renders retrieved documents into the prompt-ready context block
//! - Ingests per-subject corpora (chunk, embed in batch, insert)
//!
//! The embedding model is a seam ([`Embedder`]); the gateway never blocks
//! the request path, it only runs inside pipeline workers.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod chunker;
pub mod embedder;
pub mod error;
pub mod gateway;
pub mod ingest;

// Re-exports for convenience
pub use chunker::Chunker;
pub use embedder::Embedder;
pub use error::RetrievalError;
pub use gateway::RetrievalGateway;
pub use ingest::{DocumentFeed, Ingestor, RawDocument};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
