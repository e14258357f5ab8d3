//! Proposal evaluation and recommendation engine.
//!
//! A proposal is rendered into a rubric prompt, sent through a retried completion call,
//! parsed into validated criterion scores and reduced to an overall score, a
//! recommendation tier and a clarification flag.

pub mod completion;
pub mod domain;
pub mod error;
mod evaluator;
pub mod groq;
pub mod parser;
pub mod prompts;
pub mod repository;
pub mod retry;
pub mod router;
mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use completion::{Completion, CompletionClient, CompletionError, CompletionOptions, CompletionRequest};
pub use domain::{
    BudgetItem, Criterion, CriterionReasoning, CriterionScores, EvaluationId, EvaluationResult,
    HumanOverride, Milestone, OverrideRequest, ProposalId, ProposalInput, Recommendation,
    TeamMember,
};
pub use error::{EvaluationError, ParseError, ResponseError, ValidationError};
pub use evaluator::{
    apply_override, BatchItem, BatchOutcome, BatchSummary, EvaluatorSettings, ProposalEvaluator,
    EVALUATION_LABEL,
};
pub use groq::GroqClient;
pub use parser::{parse_evaluation_response, ParsedEvaluation};
pub use prompts::build_evaluation_prompt;
pub use repository::{EvaluationRepository, RepositoryError, StoredEvaluation};
pub use retry::{with_retry, RetryExhausted, RetryPolicy};
pub use router::evaluation_router;
pub use scoring::{
    ClarificationThresholds, CriterionWeights, RecommendationThresholds, ScoreCard, ScoringConfig,
    ScoringConfigError, ScoringEngine,
};
pub use service::{AiHealth, EvaluationService, EvaluationServiceError, Reevaluation};
