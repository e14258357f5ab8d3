use super::super::domain::{Criterion, CriterionScores, Recommendation};
use super::config::{ClarificationThresholds, RecommendationThresholds};

pub(crate) fn tier_for(overall_score: f64, thresholds: &RecommendationThresholds) -> Recommendation {
    if overall_score >= thresholds.strongly_approve {
        Recommendation::StronglyApprove
    } else if overall_score >= thresholds.approve {
        Recommendation::Approve
    } else if overall_score >= thresholds.review {
        Recommendation::Review
    } else if overall_score >= thresholds.reject {
        Recommendation::Reject
    } else {
        Recommendation::StronglyReject
    }
}

/// Clarification requires substantial missing information AND a weak critical score.
pub(crate) fn clarification_required(
    missing_information: usize,
    scores: &CriterionScores,
    thresholds: &ClarificationThresholds,
) -> bool {
    let missing = missing_information >= thresholds.missing_information;
    let weak_critical = Criterion::CRITICAL
        .iter()
        .any(|criterion| scores.get(*criterion) < thresholds.low_score);

    missing && weak_critical
}
