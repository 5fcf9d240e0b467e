//! Model reply normalization.
//!
//! Models are asked for `{"score": number, "feedback": string}` but often
//! wrap it in prose or a markdown fence. Extraction makes at most two parse
//! attempts: the whole reply, then the span from the first `{` to the last
//! `}`. The score is clamped to `[0, 100]` and rounded.

use crate::evaluation::{EvaluationResult, MAX_SCORE, MIN_SCORE};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The reply could not be turned into a score and feedback.
    #[error("Malformed model response: {reason}")]
    MalformedResponse { reason: String },
}

impl ExtractionError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}

/// Parse a raw model reply into a validated [`EvaluationResult`].
pub fn extract(raw: &str) -> Result<EvaluationResult, ExtractionError> {
    let object = parse_object(raw)
        .or_else(|| brace_span(raw).and_then(parse_object))
        .ok_or_else(|| ExtractionError::malformed("no JSON object found in reply"))?;

    let score = object
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| ExtractionError::malformed("missing numeric 'score'"))?;

    let feedback = object
        .get("feedback")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ExtractionError::malformed("missing non-empty 'feedback'"))?;

    Ok(EvaluationResult {
        score: clamp_score(score),
        feedback: feedback.to_string(),
    })
}

/// Clamp into `[0, 100]` and round half away from zero.
pub fn clamp_score(score: f64) -> u8 {
    score
        .clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE))
        .round() as u8
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Greedy span from the first `{` to the last `}`, newlines included.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
