//! Error types for the pipeline executor
//!
//! Failures are stage-tagged so the orchestrator can report which stage
//! aborted the run.

use crate::market::MarketDataError;
use crate::stage::Stage;

/// Pipeline run errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The initial subject-data fetch failed (after retries)
    #[error("market data unavailable for {subject}: {source}")]
    MarketData {
        subject: String,
        #[source]
        source: MarketDataError,
    },

    /// One stage failed; the run aborts, earlier outputs are kept in memory
    #[error("stage {stage} failed: {message}")]
    StageFailed {
        /// Name of the failing stage
        stage: &'static str,
        message: String,
    },
}

impl PipelineError {
    /// Tag an error with the stage it occurred in
    #[inline]
    #[must_use]
    pub fn stage_failed(stage: Stage, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.name(),
            message: message.into(),
        }
    }

    /// Name of the failing stage, if the failure was stage-scoped
    #[inline]
    #[must_use]
    pub fn stage_name(&self) -> Option<&'static str> {
        match self {
            Self::StageFailed { stage, .. } => Some(stage),
            Self::MarketData { .. } => None,
        }
    }
}
