//! Job orchestrator
//!
//! The check-then-act front door for analysis requests:
//! 1. Consult the latest job for the subject (dedup + freshness cache)
//! 2. Dispatch a run on the bounded worker pool when needed
//! 3. Return immediately; the run reports back over the completion channel
//!
//! A dedicated result-writer task is the only author of terminal writes,
//! which is what makes "one terminal write per job" hold by construction
//! regardless of pool size.

use crate::error::OrchestratorError;
use crate::job::{Job, JobId, JobOutcome, JobStatus};
use crate::runner::AnalysisRunner;
use crate::store::JobStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Orchestrator tuning knobs
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Maximum age of a completed result served from cache
    pub freshness_window: chrono::Duration,
    /// Budget for one run; exceeding it writes an error record
    ///
    /// Must stay safely under the outer caller's request timeout.
    pub run_timeout: Duration,
    /// Age past which an in-progress record is considered abandoned
    ///
    /// Guards against a worker that died without a terminal write wedging
    /// the subject in a permanent "in progress" answer.
    pub in_progress_grace: chrono::Duration,
    /// Worker pool size; 1 serializes all runs process-wide, which
    /// throttles rate-limited upstream providers
    pub max_concurrent_runs: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            freshness_window: chrono::Duration::hours(24),
            run_timeout: Duration::from_secs(300),
            // run timeout plus a margin for queueing in the worker pool
            in_progress_grace: chrono::Duration::seconds(360),
            max_concurrent_runs: 1,
        }
    }
}

impl OrchestratorConfig {
    /// With a freshness window
    #[inline]
    #[must_use]
    pub fn with_freshness_window(mut self, window: chrono::Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// With a run timeout
    #[inline]
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// With an in-progress grace period
    #[inline]
    #[must_use]
    pub fn with_in_progress_grace(mut self, grace: chrono::Duration) -> Self {
        self.in_progress_grace = grace;
        self
    }

    /// With a worker pool size
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_runs(mut self, max: usize) -> Self {
        self.max_concurrent_runs = max.max(1);
        self
    }
}

/// Outcome of a submit call
#[derive(Debug, Clone)]
pub enum Submission {
    /// A fresh completed result was served from the store
    Cached {
        /// The completed job holding the result
        job: Job,
    },
    /// A new run was dispatched
    Started {
        /// The new job's id, for polling
        job_id: JobId,
    },
    /// A run for this subject is already in flight
    AlreadyRunning {
        /// The in-flight job's id
        job_id: JobId,
    },
}

impl Submission {
    /// The job id this submission references
    #[inline]
    #[must_use]
    pub fn job_id(&self) -> JobId {
        match self {
            Self::Cached { job } => job.id,
            Self::Started { job_id } | Self::AlreadyRunning { job_id } => *job_id,
        }
    }
}

/// Message from a finished run to the result writer
struct Completion {
    job_id: JobId,
    subject: String,
    outcome: JobOutcome,
}

/// Analysis job orchestrator
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    runner: Arc<dyn AnalysisRunner>,
    config: OrchestratorConfig,
    pool: Arc<Semaphore>,
    completions: mpsc::Sender<Completion>,
}

impl Orchestrator {
    /// Create an orchestrator and spawn its result-writer task
    #[must_use]
    pub fn new(
        store: Arc<dyn JobStore>,
        runner: Arc<dyn AnalysisRunner>,
        config: OrchestratorConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(64);
        spawn_result_writer(store.clone(), rx);
        Self {
            pool: Arc::new(Semaphore::new(config.max_concurrent_runs)),
            store,
            runner,
            config,
            completions: tx,
        }
    }

    /// Submit an analysis request for `subject`
    ///
    /// Returns immediately in all cases; a dispatched run is observed only
    /// through the job store.
    ///
    /// # Errors
    /// - `OrchestratorError::Validation` on an empty subject
    /// - `OrchestratorError::Store` if the store fails before dispatch
    pub async fn submit(&self, subject: &str) -> Result<Submission, OrchestratorError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(OrchestratorError::Validation(
                "subject is required".to_string(),
            ));
        }

        let now = Utc::now();
        if let Some(latest) = self.store.find_latest(subject).await? {
            match latest.status {
                JobStatus::InProgress
                    if latest.age(now) <= self.config.in_progress_grace =>
                {
                    tracing::info!(subject, job_id = %latest.id, "run already in flight");
                    return Ok(Submission::AlreadyRunning { job_id: latest.id });
                }
                JobStatus::InProgress => {
                    tracing::warn!(
                        subject,
                        job_id = %latest.id,
                        age_secs = latest.age(now).num_seconds(),
                        "in-progress job exceeded grace period, treating as abandoned"
                    );
                }
                JobStatus::Completed
                    if latest.age(now) <= self.config.freshness_window =>
                {
                    tracing::info!(subject, job_id = %latest.id, "serving cached result");
                    return Ok(Submission::Cached { job: latest });
                }
                _ => {}
            }
        }

        // A store failure here surfaces to the caller instead of leaving a
        // silent in-progress state.
        let job = self.store.create(subject).await?;
        tracing::info!(subject, job_id = %job.id, "dispatching analysis run");
        self.dispatch(job.id, subject.to_string());
        Ok(Submission::Started { job_id: job.id })
    }

    /// Fire-and-forget dispatch onto the worker pool
    fn dispatch(&self, job_id: JobId, subject: String) {
        let runner = self.runner.clone();
        let pool = self.pool.clone();
        let completions = self.completions.clone();
        let budget = self.config.run_timeout;

        tokio::spawn(async move {
            let Ok(_permit) = pool.acquire_owned().await else {
                return;
            };

            let outcome = match tokio::time::timeout(budget, runner.run(&subject)).await {
                Ok(Ok(result)) => JobOutcome::Completed(result),
                Ok(Err(e)) => JobOutcome::Error(format!("analysis failed: {e}")),
                Err(_) => JobOutcome::Error(format!(
                    "analysis timed out after {}s",
                    budget.as_secs()
                )),
            };

            if completions
                .send(Completion {
                    job_id,
                    subject,
                    outcome,
                })
                .await
                .is_err()
            {
                tracing::error!(%job_id, "completion channel closed, terminal status lost");
            }
        });
    }

    /// Current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The single consumer of completion messages and sole author of terminal
/// writes. Exits when every sender (orchestrator + in-flight runs) is gone.
fn spawn_result_writer(store: Arc<dyn JobStore>, mut rx: mpsc::Receiver<Completion>) {
    tokio::spawn(async move {
        while let Some(completion) = rx.recv().await {
            let status = completion.outcome.status();
            match store.set_terminal(completion.job_id, completion.outcome).await {
                Ok(()) => tracing::info!(
                    job_id = %completion.job_id,
                    subject = completion.subject,
                    ?status,
                    "terminal status recorded"
                ),
                Err(e) => tracing::error!(
                    job_id = %completion.job_id,
                    subject = completion.subject,
                    error = %e,
                    "failed to record terminal status"
                ),
            }
        }
    });
}
