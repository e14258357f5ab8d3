use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::completion::{CompletionClient, CompletionOptions, CompletionRequest};
use super::domain::{EvaluationId, Milestone, OverrideRequest, ProposalId, ProposalInput};
use super::error::EvaluationError;
use super::evaluator::{apply_override, BatchSummary, ProposalEvaluator};
use super::repository::{EvaluationRepository, RepositoryError, StoredEvaluation};
use crate::insights::{
    generate_treasury_insights, validate_milestone, InsightError, MilestoneEvidence,
    MilestoneValidation, TreasuryInsights, TreasurySnapshot,
};

const HEALTH_PROBE_PROMPT: &str = "Respond with: OK";
const HEALTH_EXCERPT_CHARS: usize = 50;

/// Result of a store-backed re-evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reevaluation {
    pub evaluation: StoredEvaluation,
    pub is_reevaluation: bool,
}

/// Reachability of the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHealth {
    pub status: &'static str,
    pub connected: bool,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Service composing the evaluator with evaluation storage.
pub struct EvaluationService<C, R> {
    evaluator: Arc<ProposalEvaluator<C>>,
    repository: Arc<R>,
}

impl<C, R> EvaluationService<C, R>
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    pub fn new(evaluator: ProposalEvaluator<C>, repository: Arc<R>) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            repository,
        }
    }

    pub fn evaluator(&self) -> &ProposalEvaluator<C> {
        &self.evaluator
    }

    /// Evaluate a proposal and persist the result.
    pub async fn evaluate_proposal(
        &self,
        proposal: &ProposalInput,
    ) -> Result<StoredEvaluation, EvaluationServiceError> {
        let evaluation = self.evaluator.evaluate(proposal).await?;
        let stored = self.repository.save(evaluation)?;
        info!(proposal = %proposal.id, evaluation = %stored.id, "evaluation saved");
        Ok(stored)
    }

    /// Re-run the evaluation, linking it to the current stored one if any.
    pub async fn reevaluate_proposal(
        &self,
        proposal: &ProposalInput,
    ) -> Result<Reevaluation, EvaluationServiceError> {
        let prior = self.repository.latest_for_proposal(&proposal.id)?;
        let evaluation = self.evaluator.reevaluate(proposal, prior.as_ref()).await?;
        let stored = self.repository.save(evaluation)?;

        Ok(Reevaluation {
            evaluation: stored,
            is_reevaluation: prior.is_some(),
        })
    }

    pub async fn batch_evaluate(&self, proposals: &[ProposalInput]) -> BatchSummary {
        self.evaluator
            .batch_evaluate(proposals, self.repository.as_ref())
            .await
    }

    /// Apply a human override to a stored evaluation and persist it.
    pub fn override_evaluation(
        &self,
        evaluation_id: &EvaluationId,
        request: OverrideRequest,
    ) -> Result<StoredEvaluation, EvaluationServiceError> {
        let stored = self
            .repository
            .fetch(evaluation_id)?
            .ok_or(RepositoryError::NotFound)?;

        let updated = StoredEvaluation {
            id: stored.id,
            evaluation: apply_override(stored.evaluation, request),
        };
        self.repository.update(updated.clone())?;
        Ok(updated)
    }

    pub fn latest_evaluation(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<StoredEvaluation, EvaluationServiceError> {
        let stored = self
            .repository
            .latest_for_proposal(proposal_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(stored)
    }

    pub fn evaluation_history(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Vec<StoredEvaluation>, EvaluationServiceError> {
        Ok(self.repository.history(proposal_id)?)
    }

    pub async fn treasury_insights(
        &self,
        snapshot: &TreasurySnapshot,
    ) -> Result<TreasuryInsights, EvaluationServiceError> {
        let settings = self.evaluator.settings();
        Ok(generate_treasury_insights(self.evaluator.client(), &settings.retry, snapshot).await?)
    }

    pub async fn validate_milestone(
        &self,
        milestone: &Milestone,
        evidence: &MilestoneEvidence,
    ) -> Result<MilestoneValidation, EvaluationServiceError> {
        let settings = self.evaluator.settings();
        Ok(validate_milestone(self.evaluator.client(), &settings.retry, milestone, evidence).await?)
    }

    /// Single un-retried probe of the completion provider.
    pub async fn health_check(&self) -> AiHealth {
        let model = self.evaluator.settings().model.clone();
        let request = CompletionRequest::new(
            "You are a connectivity probe.",
            HEALTH_PROBE_PROMPT,
            CompletionOptions {
                temperature: 0.0,
                max_tokens: 10,
            },
        );

        match self.evaluator.client().complete(&request).await {
            Ok(completion) => AiHealth {
                status: "healthy",
                connected: true,
                model,
                response: Some(completion.text.chars().take(HEALTH_EXCERPT_CHARS).collect()),
                error: None,
            },
            Err(err) => AiHealth {
                status: "unhealthy",
                connected: false,
                model,
                response: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Insight(#[from] InsightError),
}
