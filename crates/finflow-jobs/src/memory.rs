//! In-memory job store backend

use crate::error::OrchestratorError;
use crate::job::{Job, JobId, JobOutcome};
use crate::store::JobStore;
use chrono::Utc;
use dashmap::DashMap;

/// In-memory [`JobStore`] implementation
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl MemoryJobStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// All jobs for a subject, unordered (test/diagnostic helper)
    #[must_use]
    pub fn jobs_for(&self, subject: &str) -> Vec<Job> {
        self.jobs
            .iter()
            .filter(|e| e.value().subject == subject)
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, subject: &str) -> Result<Job, OrchestratorError> {
        let job = Job::in_progress(subject, Utc::now());
        tracing::debug!(job_id = %job.id, subject, "created job");
        self.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn set_terminal(
        &self,
        id: JobId,
        outcome: JobOutcome,
    ) -> Result<(), OrchestratorError> {
        let mut entry = self
            .jobs
            .get_mut(&id)
            .ok_or(OrchestratorError::JobNotFound(id))?;
        if entry.status.is_terminal() {
            return Err(OrchestratorError::AlreadyTerminal(id));
        }

        entry.status = outcome.status();
        entry.updated_at = Utc::now();
        match outcome {
            JobOutcome::Completed(result) => entry.result = Some(result),
            JobOutcome::Error(message) => entry.error_message = Some(message),
        }
        tracing::debug!(job_id = %id, status = ?entry.status, "terminal write");
        Ok(())
    }

    async fn find_latest(&self, subject: &str) -> Result<Option<Job>, OrchestratorError> {
        Ok(self
            .jobs
            .iter()
            .filter(|e| e.value().subject == subject)
            // Ties on created_at break by id; ULIDs keep this stable.
            .max_by_key(|e| (e.value().created_at, e.value().id))
            .map(|e| e.value().clone()))
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, OrchestratorError> {
        Ok(self.jobs.get(&id).map(|e| e.value().clone()))
    }
}
