//! Pipeline stages
//!
//! The analysis chain is a fixed linear sequence, not a DAG: every stage
//! except the first consumes exactly its predecessor's output.

use serde::{Deserialize, Serialize};

/// One step of the four-stage analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Market data monitoring and trend analysis
    DataAnalysis,
    /// Trading strategy development from the data analysis
    TradingStrategy,
    /// Execution planning for the chosen strategies
    ExecutionPlanning,
    /// Risk assessment of strategies and execution plans
    RiskAssessment,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 4] = [
        Stage::DataAnalysis,
        Stage::TradingStrategy,
        Stage::ExecutionPlanning,
        Stage::RiskAssessment,
    ];

    /// Stage name, used as the `stage_outputs` key and in error tags
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::DataAnalysis => "DataAnalysis",
            Stage::TradingStrategy => "TradingStrategy",
            Stage::ExecutionPlanning => "ExecutionPlanning",
            Stage::RiskAssessment => "RiskAssessment",
        }
    }

    /// Context category retrieved before the stage runs
    #[inline]
    #[must_use]
    pub fn context_type(&self) -> &'static str {
        match self {
            Stage::DataAnalysis => "market_analysis",
            Stage::TradingStrategy => "trading_strategy",
            Stage::ExecutionPlanning => "execution_planning",
            Stage::RiskAssessment => "risk_assessment",
        }
    }

    /// The predecessor whose output this stage's prompt embeds
    #[inline]
    #[must_use]
    pub fn required_input(&self) -> Option<Stage> {
        match self {
            Stage::DataAnalysis => None,
            Stage::TradingStrategy => Some(Stage::DataAnalysis),
            Stage::ExecutionPlanning => Some(Stage::TradingStrategy),
            Stage::RiskAssessment => Some(Stage::ExecutionPlanning),
        }
    }

    /// Next stage in the chain; `None` after the last
    #[inline]
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::DataAnalysis => Some(Stage::TradingStrategy),
            Stage::TradingStrategy => Some(Stage::ExecutionPlanning),
            Stage::ExecutionPlanning => Some(Stage::RiskAssessment),
            Stage::RiskAssessment => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_strictly_linear() {
        let mut stage = Stage::DataAnalysis;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            // Every non-first stage depends on exactly the stage before it.
            assert_eq!(next.required_input(), Some(stage));
            stage = next;
            visited.push(stage);
        }
        assert_eq!(visited, Stage::ALL);
    }

    #[test]
    fn first_stage_has_no_required_input() {
        assert_eq!(Stage::DataAnalysis.required_input(), None);
    }

    #[test]
    fn context_types_are_distinct() {
        let mut types: Vec<&str> = Stage::ALL.iter().map(Stage::context_type).collect();
        types.sort_unstable();
        types.dedup();
        assert_eq!(types.len(), 4);
    }
}
