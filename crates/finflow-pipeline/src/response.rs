//! Stage model response shapes
//!
//! Model calls return free text that may or may not contain structured
//! data. That ambiguity is resolved exactly once, here, into a tagged
//! union; every downstream consumer sees one consistent shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The resolved output of one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StageOutput {
    /// Plain text the model produced; unparseable responses degrade here
    Text(String),
    /// Structured (JSON) payload extracted from the response
    Structured(Value),
}

impl StageOutput {
    /// Best-effort parse of a raw model response
    ///
    /// Tries, in order: a fenced ```json block, the whole response as a
    /// JSON object or array, then falls back to pass-through text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(block) = extract_fenced_json(raw) {
            if let Ok(value) = serde_json::from_str::<Value>(&block) {
                if value.is_object() || value.is_array() {
                    return Self::Structured(value);
                }
            }
        }

        let trimmed = raw.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return Self::Structured(value);
            }
        }

        Self::Text(raw.trim().to_string())
    }

    /// Render for embedding into a later stage's prompt
    #[must_use]
    pub fn as_prompt_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// Pull the body out of the first ```json fenced block, if any
fn extract_fenced_json(raw: &str) -> Option<String> {
    let start = raw.find("```json")? + "```json".len();
    let rest = &raw[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_bare_json_object() {
        let output = StageOutput::parse(r#"{"trend": "bullish", "confidence": 0.8}"#);
        assert_eq!(
            output,
            StageOutput::Structured(json!({"trend": "bullish", "confidence": 0.8}))
        );
    }

    #[test]
    fn parses_fenced_json_block() {
        let raw = "Here is my analysis:\n```json\n{\"signal\": \"hold\"}\n```\nDone.";
        assert_eq!(
            StageOutput::parse(raw),
            StageOutput::Structured(json!({"signal": "hold"}))
        );
    }

    #[test]
    fn unparseable_text_degrades_to_passthrough() {
        let raw = "The market looks volatile { unbalanced";
        assert_eq!(StageOutput::parse(raw), StageOutput::Text(raw.to_string()));
    }

    #[test]
    fn bare_scalar_json_stays_text() {
        // A lone number or string is not a useful structured payload.
        assert_eq!(StageOutput::parse("42"), StageOutput::Text("42".to_string()));
    }

    #[test]
    fn prompt_text_of_structured_is_pretty_json() {
        let output = StageOutput::Structured(json!({"a": 1}));
        assert!(output.as_prompt_text().contains("\"a\": 1"));
    }

    #[test]
    fn serialization_is_tagged() {
        let output = StageOutput::Text("hello".to_string());
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["kind"], "text");
        assert_eq!(value["value"], "hello");
    }
}
