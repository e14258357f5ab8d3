use super::super::domain::{Criterion, CriterionScores};
use super::config::CriterionWeights;

/// Weighted sum of the criterion scores, rounded to two decimals.
pub(crate) fn weighted_score(scores: &CriterionScores, weights: &CriterionWeights) -> f64 {
    let sum: f64 = Criterion::ALL
        .iter()
        .map(|criterion| f64::from(scores.get(*criterion)) * weights.get(*criterion))
        .sum();

    (sum * 100.0).round() / 100.0
}
