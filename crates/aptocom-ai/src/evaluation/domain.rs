use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted proposals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub String);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned by the evaluation store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of a proposal handed to the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalInput {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub sector: Option<String>,
    /// APT-denominated.
    #[serde(default)]
    pub amount_requested: Option<f64>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub budget_breakdown: Vec<BudgetItem>,
    #[serde(default)]
    pub risks: Option<String>,
    #[serde(default)]
    pub success_metrics: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "walletAddress")]
    pub wallet: Option<String>,
    #[serde(default)]
    pub time_commitment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deliverables: Vec<String>,
    #[serde(default)]
    pub funding_amount: Option<f64>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub success_criteria: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub justification: Option<String>,
}

/// The eight fixed evaluation dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    StrategicAlignment,
    Feasibility,
    TeamCapability,
    FinancialReasonableness,
    RoiPotential,
    RiskLevel,
    MilestoneClarity,
    Transparency,
}

impl Criterion {
    pub const ALL: [Criterion; 8] = [
        Criterion::StrategicAlignment,
        Criterion::Feasibility,
        Criterion::TeamCapability,
        Criterion::FinancialReasonableness,
        Criterion::RoiPotential,
        Criterion::RiskLevel,
        Criterion::MilestoneClarity,
        Criterion::Transparency,
    ];

    /// Criteria whose weakness, combined with missing information, asks for clarification.
    pub const CRITICAL: [Criterion; 3] = [
        Criterion::Feasibility,
        Criterion::TeamCapability,
        Criterion::FinancialReasonableness,
    ];

    /// JSON key used on the wire and in model responses.
    pub fn key(self) -> &'static str {
        match self {
            Criterion::StrategicAlignment => "strategicAlignment",
            Criterion::Feasibility => "feasibility",
            Criterion::TeamCapability => "teamCapability",
            Criterion::FinancialReasonableness => "financialReasonableness",
            Criterion::RoiPotential => "roiPotential",
            Criterion::RiskLevel => "riskLevel",
            Criterion::MilestoneClarity => "milestoneClarity",
            Criterion::Transparency => "transparency",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Criterion::StrategicAlignment => "Strategic Alignment",
            Criterion::Feasibility => "Feasibility",
            Criterion::TeamCapability => "Team Capability",
            Criterion::FinancialReasonableness => "Financial Reasonableness",
            Criterion::RoiPotential => "ROI Potential",
            Criterion::RiskLevel => "Risk Assessment",
            Criterion::MilestoneClarity => "Milestone Clarity",
            Criterion::Transparency => "Transparency",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-criterion scores, each an integer in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionScores {
    pub strategic_alignment: u8,
    pub feasibility: u8,
    pub team_capability: u8,
    pub financial_reasonableness: u8,
    pub roi_potential: u8,
    pub risk_level: u8,
    pub milestone_clarity: u8,
    pub transparency: u8,
}

impl CriterionScores {
    pub fn uniform(score: u8) -> Self {
        Self::from_fn(|_| score)
    }

    pub fn from_fn(mut score: impl FnMut(Criterion) -> u8) -> Self {
        Self {
            strategic_alignment: score(Criterion::StrategicAlignment),
            feasibility: score(Criterion::Feasibility),
            team_capability: score(Criterion::TeamCapability),
            financial_reasonableness: score(Criterion::FinancialReasonableness),
            roi_potential: score(Criterion::RoiPotential),
            risk_level: score(Criterion::RiskLevel),
            milestone_clarity: score(Criterion::MilestoneClarity),
            transparency: score(Criterion::Transparency),
        }
    }

    pub fn get(&self, criterion: Criterion) -> u8 {
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
}

/// Short model-written justification for each criterion score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriterionReasoning {
    pub strategic_alignment: String,
    pub feasibility: String,
    pub team_capability: String,
    pub financial_reasonableness: String,
    pub roi_potential: String,
    pub risk_level: String,
    pub milestone_clarity: String,
    pub transparency: String,
}

impl CriterionReasoning {
    pub fn get(&self, criterion: Criterion) -> &str {
        match criterion {
            Criterion::StrategicAlignment => &self.strategic_alignment,
            Criterion::Feasibility => &self.feasibility,
            Criterion::TeamCapability => &self.team_capability,
            Criterion::FinancialReasonableness => &self.financial_reasonableness,
            Criterion::RoiPotential => &self.roi_potential,
            Criterion::RiskLevel => &self.risk_level,
            Criterion::MilestoneClarity => &self.milestone_clarity,
            Criterion::Transparency => &self.transparency,
        }
    }

    pub(crate) fn set(&mut self, criterion: Criterion, text: String) {
        let slot = match criterion {
            Criterion::StrategicAlignment => &mut self.strategic_alignment,
            Criterion::Feasibility => &mut self.feasibility,
            Criterion::TeamCapability => &mut self.team_capability,
            Criterion::FinancialReasonableness => &mut self.financial_reasonableness,
            Criterion::RoiPotential => &mut self.roi_potential,
            Criterion::RiskLevel => &mut self.risk_level,
            Criterion::MilestoneClarity => &mut self.milestone_clarity,
            Criterion::Transparency => &mut self.transparency,
        };
        *slot = text;
    }
}

/// Recommendation tier derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    StronglyReject,
    Reject,
    Review,
    Approve,
    StronglyApprove,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::StronglyApprove => "strongly-approve",
            Recommendation::Approve => "approve",
            Recommendation::Review => "review",
            Recommendation::Reject => "reject",
            Recommendation::StronglyReject => "strongly-reject",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trusted human correction applied after scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanOverride {
    pub overridden: bool,
    pub overridden_by: String,
    pub override_reason: String,
    pub original_recommendation: Recommendation,
    pub overridden_at: DateTime<Utc>,
}

/// Caller-supplied override payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub overridden_by: String,
    pub reason: String,
    pub new_recommendation: Recommendation,
}

/// Structured outcome of one evaluation run.
///
/// `overall_score`, `recommendation` and `clarification_needed` are derived from the
/// scores when the result is assembled and are only readable afterwards; the one
/// sanctioned mutation is [`EvaluationResult::apply_override`]. The type is never
/// deserialized, so no document can supply derived fields that disagree with the scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub proposal_id: ProposalId,
    #[serde(flatten)]
    pub(crate) scores: CriterionScores,
    pub(crate) overall_score: f64,
    pub reasoning: CriterionReasoning,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub(crate) recommendation: Recommendation,
    pub ai_explanation: String,
    pub(crate) clarification_needed: bool,
    pub clarification_questions: Vec<String>,
    pub missing_information: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
    pub model: String,
    pub tokens_used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_evaluation_id: Option<EvaluationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_override: Option<HumanOverride>,
}

impl EvaluationResult {
    pub fn scores(&self) -> &CriterionScores {
        &self.scores
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }

    pub fn clarification_needed(&self) -> bool {
        self.clarification_needed
    }

    pub fn is_overridden(&self) -> bool {
        self.human_override
            .as_ref()
            .map(|record| record.overridden)
            .unwrap_or(false)
    }

    /// Replaces the recommendation with a trusted human decision.
    ///
    /// The first override snapshots the model's recommendation; later overrides keep it.
    /// Scores are left untouched.
    pub fn apply_override(&mut self, request: OverrideRequest, at: DateTime<Utc>) {
        let original_recommendation = match &self.human_override {
            Some(existing) if existing.overridden => existing.original_recommendation,
            _ => self.recommendation,
        };

        self.human_override = Some(HumanOverride {
            overridden: true,
            overridden_by: request.overridden_by,
            override_reason: request.reason,
            original_recommendation,
            overridden_at: at,
        });
        self.recommendation = request.new_recommendation;
    }
}
