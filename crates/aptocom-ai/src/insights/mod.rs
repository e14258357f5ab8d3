//! Auxiliary AI assessments: treasury health and milestone completion.
//!
//! Both reuse the evaluation pipeline pieces: the retried completion call and the
//! direct-then-fenced JSON extraction.

mod milestone;
mod treasury;

pub use milestone::{
    validate_milestone, MilestoneEvidence, MilestoneValidation, MilestoneVerdict,
    MILESTONE_VALIDATION_LABEL,
};
pub use treasury::{
    generate_treasury_insights, TreasuryHealth, TreasuryInsights, TreasurySnapshot,
    TreasuryTransaction, TREASURY_INSIGHTS_LABEL,
};

use crate::evaluation::completion::CompletionError;
use crate::evaluation::error::{ResponseError, ValidationError};
use crate::evaluation::retry::RetryExhausted;

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error(transparent)]
    RetryExhausted(#[from] RetryExhausted<CompletionError>),
    #[error("empty response from completion service")]
    EmptyResponse,
    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl From<ValidationError> for InsightError {
    fn from(value: ValidationError) -> Self {
        Self::Response(ResponseError::Validation(value))
    }
}

fn ensure_percentage(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if value > 100 {
        return Err(ValidationError::InvalidField {
            field,
            message: format!("{value} is outside 0-100"),
        });
    }
    Ok(())
}
