use super::common::*;
use std::sync::Arc;

use crate::evaluation::completion::CompletionError;
use crate::evaluation::domain::{EvaluationId, Milestone, OverrideRequest, ProposalId, Recommendation};
use crate::evaluation::repository::{EvaluationRepository, RepositoryError};
use crate::evaluation::{EvaluationError, EvaluationService, EvaluationServiceError};
use crate::insights::{
    InsightError, MilestoneEvidence, MilestoneVerdict, TreasuryHealth, TreasurySnapshot,
    TreasuryTransaction,
};

fn override_request(to: Recommendation) -> OverrideRequest {
    OverrideRequest {
        overridden_by: "council-member-2".to_string(),
        reason: "Known partner with prior delivery".to_string(),
        new_recommendation: to,
    }
}

fn snapshot() -> TreasurySnapshot {
    TreasurySnapshot {
        current_balance: 250_000.0,
        monthly_burn_rate: 20_000.0,
        runway_months: 12.5,
        total_allocated: 120_000.0,
        total_spent: 80_000.0,
        recent_transactions: vec![TreasuryTransaction {
            kind: "grant".to_string(),
            amount: 5_000.0,
            description: "Validator tooling milestone 1".to_string(),
        }],
    }
}

fn milestone() -> Milestone {
    Milestone {
        title: "Metrics exporter".to_string(),
        description: "Prometheus exporter for validator health".to_string(),
        deliverables: vec!["Exporter binary".to_string(), "Grafana dashboard".to_string()],
        funding_amount: Some(5_000.0),
        duration_days: Some(30),
        success_criteria: Some("Ten validators onboarded".to_string()),
    }
}

#[tokio::test]
async fn evaluate_proposal_persists_result() {
    let (service, _, repository) = build_service(vec![ok(response_text(example_scores(), &[]))]);

    let stored = service
        .evaluate_proposal(&proposal("prop-1"))
        .await
        .expect("evaluation succeeds");

    assert_eq!(stored.id, EvaluationId("eval-1".to_string()));
    assert_eq!(stored.evaluation.recommendation(), Recommendation::Approve);
    let fetched = repository
        .fetch(&stored.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(fetched, stored);
}

#[tokio::test]
async fn failed_evaluation_persists_nothing() {
    let (service, _, repository) = build_service(vec![ok("no json here")]);

    let err = service
        .evaluate_proposal(&proposal("prop-2"))
        .await
        .expect_err("parse failure");

    assert!(matches!(
        err,
        EvaluationServiceError::Evaluation(EvaluationError::Parse(_))
    ));
    assert!(repository.all().is_empty());
}

#[tokio::test]
async fn repository_outage_is_reported() {
    let client = Arc::new(ScriptedClient::new([ok(response_text(example_scores(), &[]))]));
    let service = EvaluationService::new(evaluator(client), Arc::new(UnavailableRepository));

    let err = service
        .evaluate_proposal(&proposal("prop-3"))
        .await
        .expect_err("store offline");

    assert!(matches!(
        err,
        EvaluationServiceError::Repository(RepositoryError::Unavailable(_))
    ));
}

#[tokio::test]
async fn reevaluate_appends_linked_history() {
    let (service, _, repository) = build_service(vec![
        ok(response_text(uniform_scores(50), &[])),
        ok(response_text(uniform_scores(85), &[])),
    ]);
    let proposal = proposal("prop-4");

    let first = service
        .reevaluate_proposal(&proposal)
        .await
        .expect("first run succeeds");
    assert!(!first.is_reevaluation);
    assert!(first.evaluation.evaluation.previous_evaluation_id.is_none());

    let second = service
        .reevaluate_proposal(&proposal)
        .await
        .expect("second run succeeds");
    assert!(second.is_reevaluation);
    assert_eq!(
        second.evaluation.evaluation.previous_evaluation_id,
        Some(first.evaluation.id.clone())
    );

    let history = service
        .evaluation_history(&proposal.id)
        .expect("history available");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.evaluation.id);
    assert_eq!(history[1].id, first.evaluation.id);
    assert_eq!(repository.all().len(), 2);

    let latest = service
        .latest_evaluation(&proposal.id)
        .expect("latest available");
    assert_eq!(latest.evaluation.recommendation(), Recommendation::StronglyApprove);
}

#[test]
fn latest_evaluation_for_unknown_proposal_is_not_found() {
    let (service, _, _) = build_service(Vec::new());

    let err = service
        .latest_evaluation(&ProposalId("missing".to_string()))
        .expect_err("nothing stored");

    assert!(matches!(
        err,
        EvaluationServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[test]
fn override_updates_stored_evaluation() {
    let (service, _, repository) = build_service(Vec::new());
    repository.seed(stored_evaluation("eval-9", "prop-5"));

    let updated = service
        .override_evaluation(
            &EvaluationId("eval-9".to_string()),
            override_request(Recommendation::Reject),
        )
        .expect("override applies");

    assert_eq!(updated.evaluation.recommendation(), Recommendation::Reject);
    let stored = repository
        .fetch(&EvaluationId("eval-9".to_string()))
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, updated);
    assert_eq!(stored.evaluation.overall_score(), 65.0);
    assert_eq!(
        stored
            .evaluation
            .human_override
            .as_ref()
            .map(|record| record.original_recommendation),
        Some(Recommendation::Approve)
    );
}

#[test]
fn override_of_unknown_evaluation_is_not_found() {
    let (service, _, _) = build_service(Vec::new());

    let err = service
        .override_evaluation(
            &EvaluationId("eval-404".to_string()),
            override_request(Recommendation::Approve),
        )
        .expect_err("unknown evaluation");

    assert!(matches!(
        err,
        EvaluationServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn batch_evaluate_saves_successes() {
    let (service, client, repository) = build_service(vec![
        ok(response_text(uniform_scores(70), &[])),
        ok(response_text(uniform_scores(10), &[])),
    ]);

    let summary = service
        .batch_evaluate(&[proposal("prop-6"), proposal("prop-7")])
        .await;

    assert_eq!(summary.successful, 2);
    assert_eq!(client.calls(), 2);
    let saved = repository.all();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].evaluation.recommendation(), Recommendation::StronglyReject);
}

#[tokio::test]
async fn treasury_insights_are_decoded() {
    let (service, client, _) = build_service(vec![ok(format!(
        "```json\n{}\n```",
        serde_json::json!({
            "healthStatus": "healthy",
            "healthScore": 82,
            "insights": ["Runway exceeds one year"],
            "recommendations": ["Diversify into stablecoins"],
            "risks": ["APT price volatility"],
            "opportunities": ["Staking yield"]
        })
    ))]);

    let insights = service
        .treasury_insights(&snapshot())
        .await
        .expect("insights generated");

    assert_eq!(insights.health_status, TreasuryHealth::Healthy);
    assert_eq!(insights.health_score, 82);
    assert_eq!(insights.risks, vec!["APT price volatility".to_string()]);

    let requests = client.requests();
    let request = &requests[0];
    assert_eq!(request.options.max_tokens, 2000);
    assert!(request.user_prompt.contains("Runway: 12.5 months"));
    assert!(request.user_prompt.contains("- grant: 5000 APT"));
}

#[tokio::test]
async fn treasury_score_above_range_is_rejected() {
    let (service, _, _) = build_service(vec![ok(serde_json::json!({
        "healthStatus": "critical",
        "healthScore": 140
    })
    .to_string())]);

    let err = service
        .treasury_insights(&snapshot())
        .await
        .expect_err("score out of range");

    assert!(matches!(err, EvaluationServiceError::Insight(InsightError::Response(_))));
}

#[tokio::test]
async fn milestone_validation_is_decoded() {
    let (service, client, _) = build_service(vec![ok(serde_json::json!({
        "isComplete": false,
        "completionScore": 55,
        "deliverablesMet": ["Exporter binary"],
        "deliverablesNotMet": ["Grafana dashboard"],
        "assessment": "The exporter ships but the dashboard is missing.",
        "recommendation": "request-revision"
    })
    .to_string())]);

    let validation = service
        .validate_milestone(
            &milestone(),
            &MilestoneEvidence {
                description: "Exporter released as v0.1.0".to_string(),
                links: vec!["https://github.com/example/exporter/releases".to_string()],
            },
        )
        .await
        .expect("validation succeeds");

    assert!(!validation.is_complete);
    assert_eq!(validation.recommendation, MilestoneVerdict::RequestRevision);
    assert_eq!(validation.deliverables_not_met, vec!["Grafana dashboard".to_string()]);

    let requests = client.requests();
    let request = &requests[0];
    assert_eq!(request.options.temperature, 0.2);
    assert!(request
        .user_prompt
        .contains("Expected Deliverables: Exporter binary, Grafana dashboard"));
}

#[tokio::test]
async fn milestone_with_unknown_verdict_is_rejected() {
    let (service, _, _) = build_service(vec![ok(serde_json::json!({
        "isComplete": true,
        "completionScore": 90,
        "recommendation": "pay-half"
    })
    .to_string())]);

    let err = service
        .validate_milestone(
            &milestone(),
            &MilestoneEvidence {
                description: "Done".to_string(),
                links: Vec::new(),
            },
        )
        .await
        .expect_err("unknown verdict");

    assert!(matches!(err, EvaluationServiceError::Insight(InsightError::Response(_))));
}

#[tokio::test]
async fn health_check_reports_excerpt_of_reply() {
    let reply = "OK".repeat(40);
    let (service, client, _) = build_service(vec![ok(reply)]);

    let health = service.health_check().await;

    assert!(health.connected);
    assert_eq!(health.status, "healthy");
    assert_eq!(health.model, "llama-3.3-70b-versatile");
    assert_eq!(health.response.as_deref().map(str::len), Some(50));
    assert_eq!(client.requests()[0].options.max_tokens, 10);
}

#[tokio::test]
async fn health_check_does_not_retry() {
    let (service, client, _) = build_service(vec![Err(CompletionError::Unauthorized(
        "invalid key".to_string(),
    ))]);

    let health = service.health_check().await;

    assert!(!health.connected);
    assert_eq!(health.status, "unhealthy");
    assert!(health
        .error
        .as_deref()
        .is_some_and(|error| error.contains("invalid key")));
    assert_eq!(client.calls(), 1);
}
