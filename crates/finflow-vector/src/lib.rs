//! Finflow Vector - similarity-search index
//!
//! Stores embedding vectors with document metadata and answers
//! nearest-neighbor queries:
//! - Batch ingestion with all-or-nothing validation
//! - Cosine-distance search, closest first
//! - Conjunctive metadata equality filters
//! - Optional distance threshold cutoff
//!
//! The index backend is a seam: production deployments point the
//! [`VectorStore`] trait at a managed document store, tests and the demo
//! binary use [`MemoryVectorStore`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod distance;
pub mod document;
pub mod error;
pub mod memory;
pub mod store;

// Re-exports for convenience
pub use distance::cosine_distance;
pub use document::{DocumentId, DocumentMetadata, IndexedDocument};
pub use error::VectorStoreError;
pub use memory::MemoryVectorStore;
pub use store::{MetadataFilter, SearchHit, SearchQuery, VectorStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
