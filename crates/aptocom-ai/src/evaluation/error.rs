//! Error types raised while producing an evaluation.

use super::completion::CompletionError;
use super::domain::Criterion;
use super::retry::RetryExhausted;

/// The completion text could not be read as JSON, directly or from a fenced block.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("failed to parse AI response: {message}")]
pub struct ParseError {
    pub message: String,
}

/// The completion parsed as JSON but is missing required data or carries invalid scores.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required section '{0}' in AI response")]
    MissingSection(&'static str),
    #[error("missing score for '{0}'")]
    MissingScore(Criterion),
    #[error("score for '{criterion}' is not a number: {value}")]
    NotANumber { criterion: Criterion, value: String },
    #[error("score out of range (0-100): {criterion} = {value}")]
    OutOfRange { criterion: Criterion, value: f64 },
    #[error("field '{field}' is invalid: {message}")]
    InvalidField { field: &'static str, message: String },
}

/// Either stage of response interpretation failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResponseError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure of a single evaluation run.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    RetryExhausted(#[from] RetryExhausted<CompletionError>),
    #[error("empty response from completion service")]
    EmptyResponse,
    #[error(transparent)]
    Parse(ParseError),
    #[error(transparent)]
    Validation(ValidationError),
}

impl From<ResponseError> for EvaluationError {
    fn from(value: ResponseError) -> Self {
        match value {
            ResponseError::Parse(err) => Self::Parse(err),
            ResponseError::Validation(err) => Self::Validation(err),
        }
    }
}
