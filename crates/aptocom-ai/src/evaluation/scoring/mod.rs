mod config;
mod policy;
mod rules;

pub use config::{
    ClarificationThresholds, CriterionWeights, RecommendationThresholds, ScoringConfig,
    ScoringConfigError,
};

use super::domain::{CriterionScores, Recommendation};
use super::parser::ParsedEvaluation;

/// Stateless scorer applying an immutable [`ScoringConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn calculate_overall_score(&self, scores: &CriterionScores) -> f64 {
        rules::weighted_score(scores, &self.config.weights)
    }

    pub fn determine_recommendation(&self, overall_score: f64) -> Recommendation {
        policy::tier_for(overall_score, &self.config.thresholds)
    }

    pub fn needs_clarification(&self, parsed: &ParsedEvaluation, scores: &CriterionScores) -> bool {
        policy::clarification_required(
            parsed.missing_information.len(),
            scores,
            &self.config.clarification,
        )
    }

    /// Derive every computed field for a parsed answer in one pass.
    pub fn score(&self, parsed: &ParsedEvaluation) -> ScoreCard {
        let overall_score = self.calculate_overall_score(&parsed.scores);
        ScoreCard {
            overall_score,
            recommendation: self.determine_recommendation(overall_score),
            clarification_needed: self.needs_clarification(parsed, &parsed.scores),
        }
    }
}

/// Derived portion of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCard {
    pub overall_score: f64,
    pub recommendation: Recommendation,
    pub clarification_needed: bool,
}
