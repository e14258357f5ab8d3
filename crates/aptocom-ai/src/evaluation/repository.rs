use serde::Serialize;

use super::domain::{EvaluationId, EvaluationResult, ProposalId};

/// Evaluation as persisted, paired with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvaluation {
    pub id: EvaluationId,
    #[serde(flatten)]
    pub evaluation: EvaluationResult,
}

/// Storage abstraction so the evaluator never depends on a concrete database.
///
/// History is append-only; the newest evaluation of a proposal is its current one.
pub trait EvaluationRepository: Send + Sync {
    fn save(&self, evaluation: EvaluationResult) -> Result<StoredEvaluation, RepositoryError>;
    fn update(&self, stored: StoredEvaluation) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<StoredEvaluation>, RepositoryError>;
    fn latest_for_proposal(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<StoredEvaluation>, RepositoryError>;
    /// Newest first.
    fn history(&self, proposal_id: &ProposalId) -> Result<Vec<StoredEvaluation>, RepositoryError>;
}

impl<T> EvaluationRepository for std::sync::Arc<T>
where
    T: EvaluationRepository + ?Sized,
{
    fn save(&self, evaluation: EvaluationResult) -> Result<StoredEvaluation, RepositoryError> {
        (**self).save(evaluation)
    }

    fn update(&self, stored: StoredEvaluation) -> Result<(), RepositoryError> {
        (**self).update(stored)
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<StoredEvaluation>, RepositoryError> {
        (**self).fetch(id)
    }

    fn latest_for_proposal(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<StoredEvaluation>, RepositoryError> {
        (**self).latest_for_proposal(proposal_id)
    }

    fn history(&self, proposal_id: &ProposalId) -> Result<Vec<StoredEvaluation>, RepositoryError> {
        (**self).history(proposal_id)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
