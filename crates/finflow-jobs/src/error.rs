//! Error types for job orchestration

use crate::job::JobId;

/// Orchestration errors
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Missing or invalid subject; no job is created
    #[error("invalid subject: {0}")]
    Validation(String),

    /// Caller could not be verified; no job is created
    #[error("unauthorized: {0}")]
    Auth(String),

    /// Job store read/write failed
    ///
    /// On the initial dispatch write this surfaces synchronously instead of
    /// leaving a silent in-progress state.
    #[error("job store error: {0}")]
    Store(String),

    /// Referenced job does not exist
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// A terminal status was already written for this job
    #[error("job {0} already has a terminal status")]
    AlreadyTerminal(JobId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = OrchestratorError::Validation("subject is required".to_string());
        assert!(err.to_string().contains("subject is required"));
    }
}
