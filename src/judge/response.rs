//! Extraction and lenient interpretation of model output.
//!
//! The model is asked for `[{"score": .., "explanation": ..}]` but nothing
//! guarantees it complies. Interpretation is two-stage: a strict JSON parse,
//! then independent regex searches for the score and explanation fields.
//! Nothing in this module fails; missing fields simply come back as `None`.

use crate::agent::ModelOutput;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Longest explanation returned to callers, in characters.
pub const EXPLANATION_MAX_CHARS: usize = 120;

/// Explanation used when the model returned no text at all.
pub const DEFAULT_EXPLANATION: &str = "Judge responded.";

static SCORE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:"score"|\bscore\b)\s*:\s*([-+]?[0-9]*\.?[0-9]+)"#)
        .expect("score pattern is valid")
});

static EXPLANATION_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:"explanation"|\bexplanation\b)\s*:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("explanation pattern is valid")
});

/// Score and explanation recovered from the model's text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedJudgement {
    pub score: Option<f64>,
    pub explanation: Option<String>,
}

/// Concatenate the text carried by a model output.
///
/// Candidate parts are joined in order across all candidates, skipping empty
/// fragments; no candidates means empty text.
pub async fn extract_text(output: ModelOutput) -> String {
    match output {
        ModelOutput::CallableText(text) => text.await,
        ModelOutput::StructuredCandidates(candidates) => candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .filter(|text| !text.is_empty())
            .collect(),
    }
}

/// Interpret raw model text as a score/explanation pair.
pub fn interpret_response(text: &str) -> ParsedJudgement {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ParsedJudgement::default();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => match items.first() {
            Some(Value::Object(fields)) => from_fields(fields),
            _ => ParsedJudgement::default(),
        },
        Ok(Value::Object(fields)) => from_fields(&fields),
        Ok(_) => extract_fields(trimmed),
        Err(e) => {
            tracing::debug!(error = %e, "model output is not valid JSON, using pattern fallback");
            extract_fields(trimmed)
        }
    }
}

fn from_fields(fields: &Map<String, Value>) -> ParsedJudgement {
    let score = match fields.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    let explanation = match fields.get("explanation") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    ParsedJudgement { score, explanation }
}

/// Pattern fallback for text that is not a JSON object or array.
fn extract_fields(text: &str) -> ParsedJudgement {
    let score = SCORE_FIELD
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    // The capture is the body of a JSON string literal; decode its escapes.
    let explanation = EXPLANATION_FIELD
        .captures(text)
        .and_then(|caps| serde_json::from_str::<String>(&format!("\"{}\"", &caps[1])).ok());

    ParsedJudgement { score, explanation }
}

/// Clamp a score into [0, 1]; NaN becomes 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Pick the explanation shown to the player.
///
/// A non-empty parsed explanation wins; otherwise the raw text stands in,
/// and an empty response gets a canned line. Both are capped at
/// [`EXPLANATION_MAX_CHARS`].
pub fn select_explanation(parsed: Option<&str>, raw_text: &str) -> String {
    if let Some(explanation) = parsed.filter(|e| !e.is_empty()) {
        return truncate_chars(explanation, EXPLANATION_MAX_CHARS);
    }

    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return DEFAULT_EXPLANATION.to_string();
    }
    truncate_chars(trimmed, EXPLANATION_MAX_CHARS)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
