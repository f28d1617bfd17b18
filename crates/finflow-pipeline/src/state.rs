//! Per-run pipeline state
//!
//! Owned by exactly one executor run; never shared across runs. Only
//! `stage_outputs` survives the run, folded into the job result.

use crate::response::StageOutput;
use crate::stage::Stage;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One prompt/response exchange with the stage model, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    /// Stage that issued the prompt
    pub stage: Stage,
    /// Full composed prompt sent to the model
    pub prompt: String,
    /// Raw model response, before shape resolution
    pub response: String,
}

/// Accumulated state of one pipeline run
///
/// `stage_outputs` preserves insertion order, which equals execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Subject under analysis
    pub subject: String,
    /// Stage name -> resolved output, in execution order
    pub stage_outputs: IndexMap<String, StageOutput>,
    /// Full reasoning trace, visible to later stages
    pub history: Vec<Exchange>,
}

impl PipelineState {
    /// Fresh state for one run
    #[inline]
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            stage_outputs: IndexMap::new(),
            history: Vec::new(),
        }
    }

    /// Record a completed stage
    pub fn record(&mut self, stage: Stage, prompt: String, response: String, output: StageOutput) {
        self.history.push(Exchange {
            stage,
            prompt,
            response,
        });
        self.stage_outputs.insert(stage.name().to_string(), output);
    }

    /// Output of a previously executed stage
    #[inline]
    #[must_use]
    pub fn output_for(&self, stage: Stage) -> Option<&StageOutput> {
        self.stage_outputs.get(stage.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_keep_execution_order() {
        let mut state = PipelineState::new("ACME");
        for stage in Stage::ALL {
            state.record(
                stage,
                format!("prompt for {stage}"),
                "raw".to_string(),
                StageOutput::Text(format!("output of {stage}")),
            );
        }

        let keys: Vec<&str> = state.stage_outputs.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "DataAnalysis",
                "TradingStrategy",
                "ExecutionPlanning",
                "RiskAssessment"
            ]
        );
        assert_eq!(state.history.len(), 4);
    }

    #[test]
    fn output_for_finds_recorded_stage() {
        let mut state = PipelineState::new("ACME");
        assert!(state.output_for(Stage::DataAnalysis).is_none());

        state.record(
            Stage::DataAnalysis,
            "p".to_string(),
            "r".to_string(),
            StageOutput::Text("analysis".to_string()),
        );
        assert!(state.output_for(Stage::DataAnalysis).is_some());
        assert!(state.output_for(Stage::TradingStrategy).is_none());
    }
}
