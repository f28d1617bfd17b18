//! Finflow Jobs - analysis job orchestration
//!
//! Accepts analysis requests, decides whether a new run is needed, runs
//! the pipeline off the request path, and makes the outcome durably
//! observable:
//! - Check-then-act dedup against the latest job for a subject
//! - 24 h freshness window for cached results
//! - Bounded worker pool (default 1 concurrent run)
//! - Completion messages over a channel, written by one result-writer task
//! - One terminal write per job, ever
//!
//! # Example
//!
//! ```rust,ignore
//! use finflow_jobs::{MemoryJobStore, Orchestrator, OrchestratorConfig};
//!
//! # async fn example(runner: std::sync::Arc<dyn finflow_jobs::AnalysisRunner>) {
//! let store = std::sync::Arc::new(MemoryJobStore::new());
//! let orchestrator = Orchestrator::new(store, runner, OrchestratorConfig::default());
//!
//! match orchestrator.submit("ACME").await {
//!     Ok(submission) => println!("{submission:?}"),
//!     Err(e) => eprintln!("submit failed: {e}"),
//! }
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod error;
pub mod job;
pub mod memory;
pub mod orchestrator;
pub mod runner;
pub mod store;

// Re-exports for convenience
pub use api::{
    AllowAll, AnalyzeRequest, AnalyzeResponse, AnalysisService, CallerVerifier, RequestContext,
    RequireBearer,
};
pub use error::OrchestratorError;
pub use job::{Job, JobId, JobOutcome, JobStatus};
pub use memory::MemoryJobStore;
pub use orchestrator::{Orchestrator, OrchestratorConfig, Submission};
pub use runner::{AnalysisRunner, PipelineRunner, RunError};
pub use store::JobStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
