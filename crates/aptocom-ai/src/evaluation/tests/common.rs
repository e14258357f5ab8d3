use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::evaluation::completion::{
    Completion, CompletionClient, CompletionError, CompletionRequest,
};
use crate::evaluation::domain::{
    BudgetItem, CriterionReasoning, CriterionScores, EvaluationId, EvaluationResult, Milestone,
    ProposalId, ProposalInput, Recommendation, TeamMember,
};
use crate::evaluation::repository::{EvaluationRepository, RepositoryError, StoredEvaluation};
use crate::evaluation::retry::RetryPolicy;
use crate::evaluation::{
    CompletionOptions, EvaluationService, EvaluatorSettings, ProposalEvaluator, ScoringEngine,
};

pub(super) fn proposal(id: &str) -> ProposalInput {
    ProposalInput {
        id: ProposalId(id.to_string()),
        title: "Validator observability toolkit".to_string(),
        description: "Open-source dashboards and alerting for Aptos validators.".to_string(),
        sector: Some("Infrastructure".to_string()),
        amount_requested: Some(12_000.0),
        team: vec![TeamMember {
            name: "Ada".to_string(),
            role: "Lead engineer".to_string(),
            bio: Some("Operated validators since mainnet launch".to_string()),
            wallet: Some("0xada".to_string()),
            time_commitment: Some("Full-time".to_string()),
        }],
        milestones: vec![Milestone {
            title: "Metrics exporter".to_string(),
            description: "Prometheus exporter for validator health".to_string(),
            deliverables: vec!["Exporter binary".to_string()],
            funding_amount: Some(5_000.0),
            duration_days: Some(30),
            success_criteria: Some("Ten validators onboarded".to_string()),
        }],
        budget_breakdown: vec![BudgetItem {
            category: "Engineering".to_string(),
            amount: 10_000.0,
            description: "Two engineers for two months".to_string(),
            justification: None,
        }],
        risks: None,
        success_metrics: Some("Adoption by 10% of validators".to_string()),
        timeline: Some("Three months".to_string()),
    }
}

pub(super) fn example_scores() -> Value {
    json!({
        "strategicAlignment": 85,
        "feasibility": 75,
        "teamCapability": 78,
        "financialReasonableness": 72,
        "roiPotential": 80,
        "riskLevel": 70,
        "milestoneClarity": 80,
        "transparency": 85
    })
}

pub(super) fn uniform_scores(score: u8) -> Value {
    json!({
        "strategicAlignment": score,
        "feasibility": score,
        "teamCapability": score,
        "financialReasonableness": score,
        "roiPotential": score,
        "riskLevel": score,
        "milestoneClarity": score,
        "transparency": score
    })
}

pub(super) fn response_body(scores: Value, missing_information: &[&str]) -> Value {
    json!({
        "scores": scores,
        "reasoning": {
            "strategicAlignment": "Directly supports validator decentralization.",
            "feasibility": "Scope matches the team's experience.",
            "teamCapability": "Lead has operated validators for years.",
            "financialReasonableness": "Rates are in line with the market.",
            "roiPotential": "Improves network reliability.",
            "riskLevel": "Risks are listed but mitigation is thin.",
            "milestoneClarity": "Milestones are measurable.",
            "transparency": "Team and budget are disclosed."
        },
        "strengths": ["Experienced lead"],
        "weaknesses": ["Single maintainer"],
        "opportunities": ["Adoption by other chains"],
        "threats": ["Competing tooling"],
        "missingInformation": missing_information,
        "clarificationQuestions": ["Who maintains the project after the grant?"],
        "overallAssessment": "A credible infrastructure proposal with modest risk."
    })
}

pub(super) fn response_text(scores: Value, missing_information: &[&str]) -> String {
    response_body(scores, missing_information).to_string()
}

pub(super) fn ok(text: impl Into<String>) -> Result<Completion, CompletionError> {
    Ok(Completion::new(text, Some(1_234)))
}

pub(super) fn transport_failure() -> Result<Completion, CompletionError> {
    Err(CompletionError::Transport("connection reset".to_string()))
}

/// Completion client replaying a fixed script of outcomes, one per call.
///
/// Once the script is exhausted every call fails with a transport error.
#[derive(Default)]
pub(super) struct ScriptedClient {
    script: Mutex<VecDeque<Result<Completion, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub(super) fn new(
        script: impl IntoIterator<Item = Result<Completion, CompletionError>>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.requests.lock().expect("request log poisoned").len()
    }

    pub(super) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        self.script
            .lock()
            .expect("script poisoned")
            .pop_front()
            .unwrap_or_else(transport_failure)
    }
}

pub(super) fn settings(retry_delay: Duration, batch_delay: Duration) -> EvaluatorSettings {
    EvaluatorSettings {
        model: "llama-3.3-70b-versatile".to_string(),
        options: CompletionOptions {
            temperature: 0.3,
            max_tokens: 4000,
        },
        retry: RetryPolicy::new(3, retry_delay),
        batch_delay,
    }
}

pub(super) fn evaluator(client: Arc<ScriptedClient>) -> ProposalEvaluator<Arc<ScriptedClient>> {
    ProposalEvaluator::new(
        client,
        ScoringEngine::default(),
        settings(Duration::ZERO, Duration::ZERO),
    )
}

pub(super) fn build_service(
    script: Vec<Result<Completion, CompletionError>>,
) -> (
    EvaluationService<Arc<ScriptedClient>, MemoryRepository>,
    Arc<ScriptedClient>,
    Arc<MemoryRepository>,
) {
    let client = Arc::new(ScriptedClient::new(script));
    let repository = Arc::new(MemoryRepository::default());
    let service = EvaluationService::new(evaluator(client.clone()), repository.clone());
    (service, client, repository)
}

pub(super) fn stored_evaluation(id: &str, proposal_id: &str) -> StoredEvaluation {
    StoredEvaluation {
        id: EvaluationId(id.to_string()),
        evaluation: EvaluationResult {
            proposal_id: ProposalId(proposal_id.to_string()),
            scores: CriterionScores::uniform(65),
            overall_score: 65.0,
            reasoning: CriterionReasoning::default(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            opportunities: Vec::new(),
            threats: Vec::new(),
            recommendation: Recommendation::Approve,
            ai_explanation: "Solid proposal.".to_string(),
            clarification_needed: false,
            clarification_questions: Vec::new(),
            missing_information: Vec::new(),
            evaluated_at: Utc
                .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            model: "llama-3.3-70b-versatile".to_string(),
            tokens_used: 900,
            previous_evaluation_id: None,
            human_override: None,
        },
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<StoredEvaluation>>,
}

impl MemoryRepository {
    pub(super) fn all(&self) -> Vec<StoredEvaluation> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }

    pub(super) fn seed(&self, stored: StoredEvaluation) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(stored);
    }
}

impl EvaluationRepository for MemoryRepository {
    fn save(&self, evaluation: EvaluationResult) -> Result<StoredEvaluation, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = StoredEvaluation {
            id: EvaluationId(format!("eval-{}", guard.len() + 1)),
            evaluation,
        };
        guard.push(stored.clone());
        Ok(stored)
    }

    fn update(&self, stored: StoredEvaluation) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == stored.id) {
            Some(slot) => {
                *slot = stored;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<StoredEvaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    fn latest_for_proposal(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<StoredEvaluation>, RepositoryError> {
        Ok(self.history(proposal_id)?.into_iter().next())
    }

    fn history(&self, proposal_id: &ProposalId) -> Result<Vec<StoredEvaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|stored| &stored.evaluation.proposal_id == proposal_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn save(&self, _evaluation: EvaluationResult) -> Result<StoredEvaluation, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _stored: StoredEvaluation) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<StoredEvaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_for_proposal(
        &self,
        _proposal_id: &ProposalId,
    ) -> Result<Option<StoredEvaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(
        &self,
        _proposal_id: &ProposalId,
    ) -> Result<Vec<StoredEvaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
