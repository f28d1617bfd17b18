//! Analysis runner seam
//!
//! The orchestrator dispatches runs through this trait so it can be tested
//! with scripted runners; [`PipelineRunner`] is the production adapter over
//! the pipeline executor.

use finflow_pipeline::{PipelineError, PipelineExecutor};
use serde_json::Value;
use std::sync::Arc;

/// A failed analysis run
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RunError {
    /// Human-readable failure description
    pub message: String,
    /// Failing stage name, when the failure was stage-scoped
    pub stage: Option<&'static str>,
}

impl RunError {
    /// Create a run error without a stage tag
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: None,
        }
    }
}

impl From<PipelineError> for RunError {
    fn from(e: PipelineError) -> Self {
        Self {
            stage: e.stage_name(),
            message: e.to_string(),
        }
    }
}

/// Executes one analysis run and yields the opaque result payload
#[async_trait::async_trait]
pub trait AnalysisRunner: Send + Sync {
    /// Run the analysis for `subject`
    async fn run(&self, subject: &str) -> Result<Value, RunError>;
}

/// Production adapter: runs the four-stage pipeline
pub struct PipelineRunner {
    executor: Arc<PipelineExecutor>,
}

impl PipelineRunner {
    /// Wrap a pipeline executor
    #[inline]
    #[must_use]
    pub fn new(executor: Arc<PipelineExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl AnalysisRunner for PipelineRunner {
    async fn run(&self, subject: &str) -> Result<Value, RunError> {
        let report = self.executor.run(subject).await?;
        Ok(report.to_value())
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finflow_pipeline::Stage;

    #[test]
    fn pipeline_errors_keep_their_stage_tag() {
        let err: RunError =
            PipelineError::stage_failed(Stage::RiskAssessment, "model failed").into();
        assert_eq!(err.stage, Some("RiskAssessment"));
        assert!(err.message.contains("RiskAssessment"));
    }
}
