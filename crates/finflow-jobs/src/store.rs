//! Job store seam
//!
//! Durable record of job identity, subject, status, timestamps, and result
//! payload. The backend is assumed to be a managed document store; the
//! in-memory implementation in [`crate::memory`] backs tests and the demo.
//!
//! Concurrency contract: each job receives exactly one terminal write, and
//! the orchestrator's result writer is its only author. The store also
//! rejects any write against a job that is already terminal.

use crate::error::OrchestratorError;
use crate::job::{Job, JobId, JobOutcome};

/// Durable job storage
#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Create a new in-progress job for `subject` with a server timestamp
    async fn create(&self, subject: &str) -> Result<Job, OrchestratorError>;

    /// Write the terminal status for a job
    ///
    /// # Errors
    /// - `OrchestratorError::JobNotFound` for an unknown id
    /// - `OrchestratorError::AlreadyTerminal` if a terminal status exists
    async fn set_terminal(&self, id: JobId, outcome: JobOutcome)
        -> Result<(), OrchestratorError>;

    /// Most recent job for `subject` by `created_at` descending, if any
    async fn find_latest(&self, subject: &str) -> Result<Option<Job>, OrchestratorError>;

    /// Fetch a job by id (the poll path)
    async fn get(&self, id: JobId) -> Result<Option<Job>, OrchestratorError>;
}
