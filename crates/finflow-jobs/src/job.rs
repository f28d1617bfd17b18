//! Job records
//!
//! A job is the durable trace of one dispatched analysis run. Identity is
//! independent of subject; several historical jobs may exist per subject.
//! Status moves one way only: `InProgress -> {Completed, Error}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

/// Unique job identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Generate new job ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created but not yet dispatched
    Pending,
    /// Dispatched; a worker owns the run
    InProgress,
    /// Terminal: the run produced a result
    Completed,
    /// Terminal: the run failed or timed out
    Error,
}

impl JobStatus {
    /// Whether the status is terminal
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Terminal outcome of a run, written exactly once per job
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The run produced a result payload
    Completed(Value),
    /// The run failed; human-readable message (timeouts land here too)
    Error(String),
}

impl JobOutcome {
    /// The status this outcome writes
    #[inline]
    #[must_use]
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Completed(_) => JobStatus::Completed,
            Self::Error(_) => JobStatus::Error,
        }
    }
}

/// Durable job record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// System-generated unique ID
    pub id: JobId,
    /// Subject under analysis (e.g. a ticker symbol)
    pub subject: String,
    /// Lifecycle status
    pub status: JobStatus,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time; equals `created_at` until the terminal write
    pub updated_at: DateTime<Utc>,
    /// Result payload, present only when status is `Completed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure message, present only when status is `Error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Job {
    /// Create an in-progress job for `subject` at `now`
    #[must_use]
    pub fn in_progress(subject: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: JobId::new(),
            subject: subject.into(),
            status: JobStatus::InProgress,
            created_at: now,
            updated_at: now,
            result: None,
            error_message: None,
        }
    }

    /// Age of the job relative to `now`
    #[inline]
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}
