//! Pipeline executor
//!
//! Orchestrates one analysis run: fetch subject metrics, then walk the
//! four-stage chain. Per stage: retrieve typed context, compose the prompt
//! with the predecessor output, call the stage model, resolve the response
//! shape, record it. No automatic stage retries; the first failure aborts
//! the run tagged with its stage.

use crate::error::PipelineError;
use crate::market::{fetch_with_retry, RetryPolicy, SubjectDataProvider};
use crate::model::StageModel;
use crate::prompt::{compose_prompt, stage_query};
use crate::response::StageOutput;
use crate::stage::Stage;
use crate::state::PipelineState;
use finflow_retrieval::gateway::{format_context, RetrievalGateway};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The final result of one pipeline run, folded into the job record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Subject analyzed
    pub subject: String,
    /// All four stage outputs, in execution order
    pub stage_outputs: IndexMap<String, StageOutput>,
    /// Display-formatted metrics carried through from the initial fetch
    pub financial_metrics: IndexMap<String, String>,
}

impl AnalysisReport {
    /// Serialize into the opaque job-result payload
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Null)
    }
}

/// Runs the fixed analysis chain for one subject
pub struct PipelineExecutor {
    gateway: RetrievalGateway,
    model: Arc<dyn StageModel>,
    provider: Arc<dyn SubjectDataProvider>,
    retry: RetryPolicy,
}

impl PipelineExecutor {
    /// Create an executor from its injected collaborators
    #[inline]
    #[must_use]
    pub fn new(
        gateway: RetrievalGateway,
        model: Arc<dyn StageModel>,
        provider: Arc<dyn SubjectDataProvider>,
    ) -> Self {
        Self {
            gateway,
            model,
            provider,
            retry: RetryPolicy::default(),
        }
    }

    /// With a custom market-data retry policy
    #[inline]
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Execute the full chain for `subject`
    ///
    /// # Errors
    /// - `PipelineError::MarketData` if the initial fetch fails after retries
    /// - `PipelineError::StageFailed` tagged with the first failing stage
    pub async fn run(&self, subject: &str) -> Result<AnalysisReport, PipelineError> {
        tracing::info!(subject, "starting analysis run");

        let metrics = fetch_with_retry(self.provider.as_ref(), subject, self.retry)
            .await
            .map_err(|source| PipelineError::MarketData {
                subject: subject.to_string(),
                source,
            })?;

        let mut state = PipelineState::new(subject);
        for stage in Stage::ALL {
            self.run_stage(stage, &mut state).await?;
        }

        tracing::info!(subject, stages = state.stage_outputs.len(), "run complete");
        Ok(AnalysisReport {
            subject: subject.to_string(),
            stage_outputs: state.stage_outputs,
            financial_metrics: metrics.display_fields(),
        })
    }

    async fn run_stage(
        &self,
        stage: Stage,
        state: &mut PipelineState,
    ) -> Result<(), PipelineError> {
        tracing::debug!(stage = stage.name(), subject = %state.subject, "running stage");

        let query = stage_query(stage, &state.subject);
        let docs = self
            .gateway
            .retrieve(&query, Some(stage.context_type()))
            .await
            .map_err(|e| PipelineError::stage_failed(stage, format!("retrieval failed: {e}")))?;
        let context = format_context(&docs);

        let prior = stage
            .required_input()
            .and_then(|p| state.output_for(p).cloned().map(|o| (p, o)));
        let prompt = compose_prompt(
            stage,
            &state.subject,
            &context,
            prior.as_ref().map(|(p, o)| (*p, o)),
        );

        let raw = self
            .model
            .run(&prompt)
            .await
            .map_err(|e| PipelineError::stage_failed(stage, e.to_string()))?;

        let output = StageOutput::parse(&raw);
        state.record(stage, prompt, raw, output);
        Ok(())
    }
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MarketDataError, SubjectMetrics};
    use crate::model::ModelError;
    use finflow_retrieval::{Embedder, RetrievalError};
    use finflow_vector::MemoryVectorStore;
    use std::sync::Mutex;

    struct ConstEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ConstEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Echoes the call number as structured output; fails the nth call
    /// when configured.
    struct ScriptedModel {
        fail_on_call: Option<usize>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn ok() -> Self {
            Self {
                fail_on_call: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing_on_call(n: usize) -> Self {
            Self {
                fail_on_call: Some(n),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl StageModel for ScriptedModel {
        async fn run(&self, prompt: &str) -> Result<String, ModelError> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            let n = prompts.len();
            if self.fail_on_call == Some(n) {
                return Err(ModelError::Call("upstream exploded".to_string()));
            }
            Ok(format!(r#"{{"stage_number": {n}}}"#))
        }
    }

    struct StaticProvider;

    #[async_trait::async_trait]
    impl SubjectDataProvider for StaticProvider {
        async fn fetch(&self, subject: &str) -> Result<SubjectMetrics, MarketDataError> {
            if subject == "MISSING" {
                return Err(MarketDataError::NotFound(subject.to_string()));
            }
            Ok(SubjectMetrics {
                current_price: Some(42.0),
                ..Default::default()
            })
        }
    }

    fn executor(model: ScriptedModel) -> PipelineExecutor {
        let gateway = RetrievalGateway::new(
            Arc::new(ConstEmbedder),
            Arc::new(MemoryVectorStore::new()),
        );
        PipelineExecutor::new(gateway, Arc::new(model), Arc::new(StaticProvider))
    }

    #[tokio::test]
    async fn run_produces_all_four_stage_outputs_in_order() {
        let report = executor(ScriptedModel::ok()).run("ACME").await.unwrap();

        let keys: Vec<&str> = report.stage_outputs.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "DataAnalysis",
                "TradingStrategy",
                "ExecutionPlanning",
                "RiskAssessment"
            ]
        );
        assert_eq!(report.financial_metrics["Current Price"], "$42.00");
        assert_eq!(report.financial_metrics["Beta"], "N/A");
    }

    #[tokio::test]
    async fn structured_responses_are_resolved_once() {
        let report = executor(ScriptedModel::ok()).run("ACME").await.unwrap();
        for output in report.stage_outputs.values() {
            assert!(matches!(output, StageOutput::Structured(_)));
        }
    }

    #[tokio::test]
    async fn stage_failure_is_tagged_and_aborts() {
        // Second model call = TradingStrategy.
        let err = executor(ScriptedModel::failing_on_call(2))
            .run("ACME")
            .await
            .unwrap_err();
        assert_eq!(err.stage_name(), Some("TradingStrategy"));
    }

    #[tokio::test]
    async fn missing_subject_fails_before_any_stage() {
        let model = ScriptedModel::ok();
        let exec = executor(model);
        let err = exec.run("MISSING").await.unwrap_err();
        assert!(matches!(err, PipelineError::MarketData { .. }));
    }

    #[tokio::test]
    async fn later_stages_see_predecessor_output() {
        let gateway = RetrievalGateway::new(
            Arc::new(ConstEmbedder),
            Arc::new(MemoryVectorStore::new()),
        );
        let model = Arc::new(ScriptedModel::ok());
        let exec = PipelineExecutor::new(gateway, model.clone(), Arc::new(StaticProvider));
        exec.run("ACME").await.unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);
        // Stage 2's prompt embeds stage 1's structured output.
        assert!(prompts[1].contains("DataAnalysis output:"));
        assert!(prompts[1].contains("\"stage_number\": 1"));
        // Stage 4 depends on stage 3, not stage 1.
        assert!(prompts[3].contains("ExecutionPlanning output:"));
        assert!(!prompts[3].contains("DataAnalysis output:"));
    }

    #[tokio::test]
    async fn report_serializes_to_job_payload() {
        let report = executor(ScriptedModel::ok()).run("ACME").await.unwrap();
        let value = report.to_value();
        assert_eq!(value["subject"], "ACME");
        assert!(value["stage_outputs"]["RiskAssessment"].is_object());
        assert_eq!(value["financial_metrics"]["Current Price"], "$42.00");
    }
}
