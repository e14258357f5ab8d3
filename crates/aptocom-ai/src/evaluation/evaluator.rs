use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::completion::{
    Completion, CompletionClient, CompletionError, CompletionOptions, CompletionRequest,
};
use super::domain::{EvaluationId, EvaluationResult, OverrideRequest, ProposalId, ProposalInput};
use super::error::EvaluationError;
use super::parser::parse_evaluation_response;
use super::prompts::{build_evaluation_prompt, EVALUATION_SYSTEM_PROMPT};
use super::repository::{EvaluationRepository, StoredEvaluation};
use super::retry::{with_retry, RetryExhausted, RetryPolicy};
use super::scoring::ScoringEngine;
use crate::config::AiConfig;

pub const EVALUATION_LABEL: &str = "AI evaluation";

/// Model identity, sampling and pacing used by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorSettings {
    pub model: String,
    pub options: CompletionOptions,
    pub retry: RetryPolicy,
    pub batch_delay: Duration,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        EvaluatorSettings::from(&AiConfig::default())
    }
}

impl From<&AiConfig> for EvaluatorSettings {
    fn from(config: &AiConfig) -> Self {
        Self {
            model: config.model.clone(),
            options: CompletionOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
            retry: RetryPolicy::new(config.max_attempts, config.retry_delay),
            batch_delay: config.batch_delay,
        }
    }
}

/// Outcome of one batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BatchOutcome {
    #[serde(rename_all = "camelCase")]
    Evaluated { evaluation_id: EvaluationId },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub proposal_id: ProposalId,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Evaluated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItem>,
}

/// Composes prompt rendering, the retried completion call, parsing and scoring.
///
/// Holds no mutable state, so independent proposals may be evaluated concurrently.
pub struct ProposalEvaluator<C> {
    client: C,
    scoring: ScoringEngine,
    settings: EvaluatorSettings,
}

impl<C> ProposalEvaluator<C>
where
    C: CompletionClient,
{
    pub fn new(client: C, scoring: ScoringEngine, settings: EvaluatorSettings) -> Self {
        Self {
            client,
            scoring,
            settings,
        }
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// Issue a completion through the retry executor.
    pub(crate) async fn complete_with_retry(
        &self,
        request: &CompletionRequest,
        label: &str,
    ) -> Result<Completion, RetryExhausted<CompletionError>> {
        with_retry(&self.settings.retry, label, || self.client.complete(request)).await
    }

    /// Evaluate a proposal. Persistence is left to the caller.
    pub async fn evaluate(
        &self,
        proposal: &ProposalInput,
    ) -> Result<EvaluationResult, EvaluationError> {
        info!(proposal = %proposal.id, model = %self.settings.model, "starting AI evaluation");

        let request = CompletionRequest::new(
            EVALUATION_SYSTEM_PROMPT,
            build_evaluation_prompt(proposal),
            self.settings.options,
        );
        let completion = self.complete_with_retry(&request, EVALUATION_LABEL).await?;

        if completion.is_empty() {
            warn!(proposal = %proposal.id, "completion returned no text");
            return Err(EvaluationError::EmptyResponse);
        }

        let parsed = parse_evaluation_response(&completion.text).map_err(|err| {
            warn!(proposal = %proposal.id, error = %err, "AI response rejected");
            EvaluationError::from(err)
        })?;

        let card = self.scoring.score(&parsed);

        info!(
            proposal = %proposal.id,
            overall_score = card.overall_score,
            recommendation = %card.recommendation,
            clarification_needed = card.clarification_needed,
            tokens = completion.usage_tokens.unwrap_or(0),
            "AI evaluation completed"
        );

        Ok(EvaluationResult {
            proposal_id: proposal.id.clone(),
            scores: parsed.scores,
            overall_score: card.overall_score,
            reasoning: parsed.reasoning,
            strengths: parsed.strengths,
            weaknesses: parsed.weaknesses,
            opportunities: parsed.opportunities,
            threats: parsed.threats,
            recommendation: card.recommendation,
            ai_explanation: parsed.overall_assessment,
            clarification_needed: card.clarification_needed,
            clarification_questions: parsed.clarification_questions,
            missing_information: parsed.missing_information,
            evaluated_at: Utc::now(),
            model: self.settings.model.clone(),
            tokens_used: completion.usage_tokens.unwrap_or(0),
            previous_evaluation_id: None,
            human_override: None,
        })
    }

    /// Run a fresh, independent evaluation and link it to the prior one when given.
    pub async fn reevaluate(
        &self,
        proposal: &ProposalInput,
        prior: Option<&StoredEvaluation>,
    ) -> Result<EvaluationResult, EvaluationError> {
        if let Some(prior) = prior {
            if prior.evaluation.proposal_id != proposal.id {
                warn!(
                    proposal = %proposal.id,
                    prior_proposal = %prior.evaluation.proposal_id,
                    "prior evaluation belongs to a different proposal"
                );
            }
        }

        let mut evaluation = self.evaluate(proposal).await?;
        evaluation.previous_evaluation_id = prior.map(|stored| stored.id.clone());
        Ok(evaluation)
    }

    /// Evaluate proposals one at a time, saving each success.
    ///
    /// Individual failures are recorded and never abort the batch. `batch_delay` is
    /// slept between consecutive items.
    pub async fn batch_evaluate<R>(&self, proposals: &[ProposalInput], repository: &R) -> BatchSummary
    where
        R: EvaluationRepository + ?Sized,
    {
        info!(total = proposals.len(), "starting batch evaluation");

        let mut results = Vec::with_capacity(proposals.len());
        for (idx, proposal) in proposals.iter().enumerate() {
            if idx > 0 && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }

            let outcome = match self.evaluate(proposal).await {
                Ok(evaluation) => match repository.save(evaluation) {
                    Ok(stored) => BatchOutcome::Evaluated {
                        evaluation_id: stored.id,
                    },
                    Err(err) => BatchOutcome::Failed {
                        error: err.to_string(),
                    },
                },
                Err(err) => BatchOutcome::Failed {
                    error: err.to_string(),
                },
            };

            if let BatchOutcome::Failed { error } = &outcome {
                warn!(proposal = %proposal.id, %error, "batch item failed");
            }

            results.push(BatchItem {
                proposal_id: proposal.id.clone(),
                outcome,
            });
        }

        let successful = results.iter().filter(|item| item.is_success()).count();
        info!(
            successful,
            total = proposals.len(),
            "batch evaluation completed"
        );

        BatchSummary {
            total: proposals.len(),
            successful,
            failed: proposals.len() - successful,
            results,
        }
    }
}

/// Record a trusted human decision on an evaluation without re-scoring it.
pub fn apply_override(mut evaluation: EvaluationResult, request: OverrideRequest) -> EvaluationResult {
    info!(
        proposal = %evaluation.proposal_id,
        overridden_by = %request.overridden_by,
        from = %evaluation.recommendation,
        to = %request.new_recommendation,
        "applying human override"
    );
    evaluation.apply_override(request, Utc::now());
    evaluation
}
