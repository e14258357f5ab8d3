//! Interpretation of raw completion text.
//!
//! The text is read as JSON directly, then from the first fenced code block. Only a
//! fully validated [`ParsedEvaluation`] leaves this module.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::domain::{Criterion, CriterionReasoning, CriterionScores};
use super::error::{ParseError, ResponseError, ValidationError};

/// Validated model answer, ready for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvaluation {
    pub scores: CriterionScores,
    pub reasoning: CriterionReasoning,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub missing_information: Vec<String>,
    pub clarification_questions: Vec<String>,
    pub overall_assessment: String,
}

/// Parse and validate an evaluation completion.
pub fn parse_evaluation_response(raw: &str) -> Result<ParsedEvaluation, ResponseError> {
    let value = extract_json(raw)?;
    Ok(validate_evaluation(&value)?)
}

/// Read `raw` as JSON, falling back to the first fenced code block holding a JSON object.
///
/// On total failure the error carries the message of the direct parse attempt.
pub fn extract_json(raw: &str) -> Result<Value, ParseError> {
    let direct_error = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    fenced_blocks(raw)
        .filter_map(|body| serde_json::from_str::<Value>(body.trim()).ok())
        .find(Value::is_object)
        .ok_or_else(|| ParseError {
            message: direct_error.to_string(),
        })
}

/// Extract JSON from `raw` and decode it into `T`; decode failures are validation errors.
pub fn decode_payload<T>(raw: &str, section: &'static str) -> Result<T, ResponseError>
where
    T: DeserializeOwned,
{
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|err| {
        ResponseError::Validation(ValidationError::InvalidField {
            field: section,
            message: err.to_string(),
        })
    })
}

/// Bodies of every closed triple-backtick block in order, with an optional `json` tag skipped.
fn fenced_blocks(content: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = content;
    std::iter::from_fn(move || loop {
        let fence_start = rest.find("```")?;
        let after_opening = &rest[fence_start + 3..];

        let body = if after_opening
            .get(..4)
            .map(|tag| tag.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
        {
            &after_opening[4..]
        } else {
            after_opening
        };

        let closing = body.find("```")?;
        let inner = &body[..closing];
        rest = &body[closing + 3..];
        if !inner.trim().is_empty() {
            return Some(inner);
        }
    })
}

fn validate_evaluation(value: &Value) -> Result<ParsedEvaluation, ValidationError> {
    let root = value
        .as_object()
        .ok_or(ValidationError::MissingSection("scores"))?;

    let scores_section = root
        .get("scores")
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingSection("scores"))?;
    let reasoning_section = root
        .get("reasoning")
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingSection("reasoning"))?;

    let mut validated = [0u8; 8];
    for (slot, criterion) in validated.iter_mut().zip(Criterion::ALL) {
        *slot = read_score(scores_section, criterion)?;
    }
    let scores = CriterionScores::from_fn(|criterion| validated[criterion as usize]);

    let mut reasoning = CriterionReasoning::default();
    for criterion in Criterion::ALL {
        if let Some(text) = reasoning_section.get(criterion.key()).and_then(Value::as_str) {
            reasoning.set(criterion, text.to_string());
        }
    }

    Ok(ParsedEvaluation {
        scores,
        reasoning,
        strengths: string_list(root, "strengths"),
        weaknesses: string_list(root, "weaknesses"),
        opportunities: string_list(root, "opportunities"),
        threats: string_list(root, "threats"),
        missing_information: string_list(root, "missingInformation"),
        clarification_questions: string_list(root, "clarificationQuestions"),
        overall_assessment: root
            .get("overallAssessment")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn read_score(section: &Map<String, Value>, criterion: Criterion) -> Result<u8, ValidationError> {
    let raw = section
        .get(criterion.key())
        .ok_or(ValidationError::MissingScore(criterion))?;

    let value = raw.as_f64().ok_or_else(|| ValidationError::NotANumber {
        criterion,
        value: raw.to_string(),
    })?;

    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange { criterion, value });
    }

    // Fractional scores are rounded onto the integer scale.
    Ok(value.round() as u8)
}

// Non-string items are kept as their JSON text so list lengths match the model's answer.
fn string_list(root: &Map<String, Value>, key: &str) -> Vec<String> {
    root.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
