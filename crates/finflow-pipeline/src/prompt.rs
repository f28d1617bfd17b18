//! Stage prompt composition
//!
//! Pure string building: retrieval query per stage, fixed per-stage
//! instructions, and the final prompt embedding the retrieved context block
//! plus the required predecessor output.

use crate::response::StageOutput;
use crate::stage::Stage;

/// The free-text retrieval query issued before a stage runs
#[must_use]
pub fn stage_query(stage: Stage, subject: &str) -> String {
    match stage {
        Stage::DataAnalysis => {
            format!("Analyzing market data for {subject} to identify trends and opportunities")
        }
        Stage::TradingStrategy => format!(
            "Developing trading strategies for {subject} based on market analysis and risk parameters"
        ),
        Stage::ExecutionPlanning => {
            format!("Planning optimal execution strategies for {subject} trades")
        }
        Stage::RiskAssessment => format!(
            "Assessing risks and developing mitigation strategies for {subject} trading activities"
        ),
    }
}

/// Fixed instructions for a stage
#[must_use]
pub fn stage_instructions(stage: Stage, subject: &str) -> String {
    match stage {
        Stage::DataAnalysis => format!(
            "Monitor and analyze market data for {subject}. Use statistical reasoning to \
             identify trends and predict market movements. Produce insights and alerts about \
             significant market opportunities or threats for {subject}."
        ),
        Stage::TradingStrategy => format!(
            "Develop and refine trading strategies for {subject} based on the insights from \
             the data analysis and a medium risk tolerance with a 1 year trading preference. \
             Produce a set of potential trading strategies that align with the user's risk \
             tolerance."
        ),
        Stage::ExecutionPlanning => format!(
            "Analyze the approved trading strategies to determine the best execution methods \
             for {subject}, considering current market conditions and optimal pricing. Produce \
             detailed execution plans suggesting how and when to execute trades."
        ),
        Stage::RiskAssessment => format!(
            "Evaluate the risks associated with the proposed trading strategies and execution \
             plans for {subject}. Produce a comprehensive risk analysis report detailing \
             potential risks and mitigation recommendations."
        ),
    }
}

/// Compose the full prompt for one stage
///
/// Layout: retrieved context block, instructions, then the predecessor
/// output this stage depends on (if any), then the response-format note.
#[must_use]
pub fn compose_prompt(
    stage: Stage,
    subject: &str,
    context_block: &str,
    prior: Option<(Stage, &StageOutput)>,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(context_block);
    prompt.push('\n');
    prompt.push_str(&stage_instructions(stage, subject));

    if let Some((prior_stage, output)) = prior {
        prompt.push_str(&format!(
            "\n\n{} output:\n{}",
            prior_stage.name(),
            output.as_prompt_text()
        ));
    }

    prompt.push_str("\n\nRespond with a JSON object when possible.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_mention_the_subject() {
        for stage in Stage::ALL {
            assert!(stage_query(stage, "ACME").contains("ACME"));
        }
    }

    #[test]
    fn prompt_embeds_context_and_instructions() {
        let prompt = compose_prompt(
            Stage::DataAnalysis,
            "ACME",
            "Relevant Context:\n\n",
            None,
        );
        assert!(prompt.starts_with("Relevant Context:"));
        assert!(prompt.contains("market data for ACME"));
        assert!(!prompt.contains("output:"));
    }

    #[test]
    fn prompt_embeds_predecessor_output() {
        let prior = StageOutput::Text("bullish breakout".to_string());
        let prompt = compose_prompt(
            Stage::TradingStrategy,
            "ACME",
            "Relevant Context:\n\n",
            Some((Stage::DataAnalysis, &prior)),
        );
        assert!(prompt.contains("DataAnalysis output:\nbullish breakout"));
    }
}
