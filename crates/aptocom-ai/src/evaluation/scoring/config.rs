use serde::{Deserialize, Serialize};

use super::super::domain::Criterion;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Relative importance of each criterion in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionWeights {
    pub strategic_alignment: f64,
    pub feasibility: f64,
    pub team_capability: f64,
    pub financial_reasonableness: f64,
    pub roi_potential: f64,
    pub risk_level: f64,
    pub milestone_clarity: f64,
    pub transparency: f64,
}

impl CriterionWeights {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::StrategicAlignment => self.strategic_alignment,
            Criterion::Feasibility => self.feasibility,
            Criterion::TeamCapability => self.team_capability,
            Criterion::FinancialReasonableness => self.financial_reasonableness,
            Criterion::RoiPotential => self.roi_potential,
            Criterion::RiskLevel => self.risk_level,
            Criterion::MilestoneClarity => self.milestone_clarity,
            Criterion::Transparency => self.transparency,
        }
    }

    pub fn total(&self) -> f64 {
        Criterion::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

impl Default for CriterionWeights {
    fn default() -> Self {
        Self {
            strategic_alignment: 0.15,
            feasibility: 0.20,
            team_capability: 0.15,
            financial_reasonableness: 0.15,
            roi_potential: 0.10,
            risk_level: 0.10,
            milestone_clarity: 0.10,
            transparency: 0.05,
        }
    }
}

/// Lower bounds of the recommendation ladder; anything below `reject` is strongly rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationThresholds {
    pub strongly_approve: f64,
    pub approve: f64,
    pub review: f64,
    pub reject: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            strongly_approve: 80.0,
            approve: 60.0,
            review: 40.0,
            reject: 20.0,
        }
    }
}

/// Both limits must be met before clarification is requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationThresholds {
    pub missing_information: usize,
    pub low_score: u8,
}

impl Default for ClarificationThresholds {
    fn default() -> Self {
        Self {
            missing_information: 3,
            low_score: 30,
        }
    }
}

/// Immutable scoring table handed to the engine at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub weights: CriterionWeights,
    pub thresholds: RecommendationThresholds,
    pub clarification: ClarificationThresholds,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if let Some(criterion) = Criterion::ALL
            .iter()
            .copied()
            .find(|c| self.weights.get(*c) < 0.0 || !self.weights.get(*c).is_finite())
        {
            return Err(ScoringConfigError::InvalidWeight {
                criterion,
                weight: self.weights.get(criterion),
            });
        }

        let total = self.weights.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ScoringConfigError::WeightSum(total));
        }

        let ladder = [
            self.thresholds.strongly_approve,
            self.thresholds.approve,
            self.thresholds.review,
            self.thresholds.reject,
        ];
        let in_range = ladder.iter().all(|t| (0.0..=100.0).contains(t));
        let descending = ladder.windows(2).all(|pair| pair[0] > pair[1]);
        if !in_range || !descending {
            return Err(ScoringConfigError::Thresholds);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("weight for '{criterion}' must be a non-negative number, got {weight}")]
    InvalidWeight { criterion: Criterion, weight: f64 },
    #[error("criterion weights must sum to 1.0, got {0}")]
    WeightSum(f64),
    #[error("recommendation thresholds must be strictly descending within 0-100")]
    Thresholds,
}
