use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::completion::CompletionClient;
use super::domain::{EvaluationId, Milestone, OverrideRequest, ProposalId, ProposalInput};
use super::repository::{EvaluationRepository, RepositoryError};
use super::service::{EvaluationService, EvaluationServiceError};
use crate::insights::{MilestoneEvidence, TreasurySnapshot};

/// Router builder exposing HTTP endpoints for evaluation, oversight and insights.
pub fn evaluation_router<C, R>(service: Arc<EvaluationService<C, R>>) -> Router
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    Router::new()
        .route("/api/v1/proposals/evaluate", post(evaluate_handler::<C, R>))
        .route(
            "/api/v1/proposals/batch-evaluate",
            post(batch_handler::<C, R>),
        )
        .route(
            "/api/v1/proposals/:proposal_id/reevaluate",
            post(reevaluate_handler::<C, R>),
        )
        .route(
            "/api/v1/proposals/:proposal_id/evaluation",
            get(latest_handler::<C, R>),
        )
        .route(
            "/api/v1/proposals/:proposal_id/evaluations",
            get(history_handler::<C, R>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/override",
            post(override_handler::<C, R>),
        )
        .route(
            "/api/v1/treasury/insights",
            post(treasury_handler::<C, R>),
        )
        .route(
            "/api/v1/milestones/validate",
            post(milestone_handler::<C, R>),
        )
        .route("/api/v1/ai/health", get(health_handler::<C, R>))
        .with_state(service)
}

fn error_response(error: EvaluationServiceError) -> Response {
    let status = match &error {
        EvaluationServiceError::Evaluation(_) | EvaluationServiceError::Insight(_) => {
            StatusCode::BAD_GATEWAY
        }
        EvaluationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EvaluationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EvaluationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn evaluate_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Json(proposal): Json<ProposalInput>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    match service.evaluate_proposal(&proposal).await {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reevaluate_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Path(proposal_id): Path<String>,
    Json(mut proposal): Json<ProposalInput>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    // The path is authoritative for which proposal's history is extended.
    proposal.id = ProposalId(proposal_id);
    match service.reevaluate_proposal(&proposal).await {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn batch_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Json(proposals): Json<Vec<ProposalInput>>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    let summary = service.batch_evaluate(&proposals).await;
    (StatusCode::OK, Json(summary)).into_response()
}

pub(crate) async fn latest_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Path(proposal_id): Path<String>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    match service.latest_evaluation(&ProposalId(proposal_id)) {
        Ok(stored) => (StatusCode::OK, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Path(proposal_id): Path<String>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    match service.evaluation_history(&ProposalId(proposal_id)) {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn override_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Path(evaluation_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    match service.override_evaluation(&EvaluationId(evaluation_id), request) {
        Ok(stored) => (StatusCode::OK, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn treasury_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Json(snapshot): Json<TreasurySnapshot>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    match service.treasury_insights(&snapshot).await {
        Ok(insights) => (StatusCode::OK, Json(insights)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MilestoneValidationRequest {
    pub(crate) milestone: Milestone,
    pub(crate) evidence: MilestoneEvidence,
}

pub(crate) async fn milestone_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
    Json(request): Json<MilestoneValidationRequest>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    match service
        .validate_milestone(&request.milestone, &request.evidence)
        .await
    {
        Ok(validation) => (StatusCode::OK, Json(validation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn health_handler<C, R>(
    State(service): State<Arc<EvaluationService<C, R>>>,
) -> Response
where
    C: CompletionClient + 'static,
    R: EvaluationRepository + 'static,
{
    let health = service.health_check().await;
    let status = if health.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health)).into_response()
}
