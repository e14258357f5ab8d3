//! Prompts for proposal evaluation

use super::domain::{Criterion, ProposalInput};

/// Placeholder rendered for any optional field the proposer left empty.
pub const NOT_SPECIFIED: &str = "Not specified";

/// System prompt for proposal evaluation
pub const EVALUATION_SYSTEM_PROMPT: &str = "You are an expert proposal evaluator for a DAO on the Aptos blockchain. Respond with valid JSON only, no markdown formatting.";

fn rubric(criterion: Criterion) -> (&'static str, &'static [&'static str]) {
    match criterion {
        Criterion::StrategicAlignment => (
            "How well does the proposal advance the DAO's mission and the Aptos ecosystem?",
            &[
                "Relevance to DAO goals and vision",
                "Potential impact on the Aptos ecosystem",
                "Alignment with community priorities",
                "Innovation and uniqueness",
            ],
        ),
        Criterion::Feasibility => (
            "How technically and operationally viable is the proposal?",
            &[
                "Technical complexity against team capability",
                "Resource requirements against availability",
                "Timeline realism",
                "Dependencies and blockers",
                "Proof of concept or prior work",
            ],
        ),
        Criterion::TeamCapability => (
            "How qualified is the team to execute?",
            &[
                "Relevant experience and expertise",
                "Team composition and completeness",
                "Track record and reputation",
                "Adequacy of time commitment",
                "Skill gaps or concerns",
            ],
        ),
        Criterion::FinancialReasonableness => (
            "Is the budget justified and efficient?",
            &[
                "Budget size relative to scope",
                "Clarity and detail of the cost breakdown",
                "Comparison with market rates",
                "Contingency planning",
                "Value for money",
            ],
        ),
        Criterion::RoiPotential => (
            "What return can the DAO expect on this investment?",
            &[
                "Quantifiable benefits (revenue, tokens, users)",
                "Strategic benefits (partnerships, visibility)",
                "Long-term value creation",
                "Measurability of returns",
                "Time to value",
            ],
        ),
        Criterion::RiskLevel => (
            "How well are risks identified and mitigated?",
            &[
                "Completeness of risk identification",
                "Quality of mitigation strategies",
                "Likelihood and impact of risks",
                "Contingency plans",
                "Balance of risk and reward",
            ],
        ),
        Criterion::MilestoneClarity => (
            "How clear, measurable and achievable are the milestones?",
            &[
                "Clarity of milestone definitions",
                "Specificity of deliverables",
                "Measurability of success criteria",
                "Appropriateness of the timeline",
                "Feasibility of progress tracking",
            ],
        ),
        Criterion::Transparency => (
            "How transparent and complete is the information provided?",
            &[
                "Completeness of information",
                "Quality of documentation",
                "Clarity of communication",
                "Identification of team members",
                "Openness about challenges",
            ],
        ),
    }
}

fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => NOT_SPECIFIED,
    }
}

fn amount(value: Option<f64>) -> String {
    match value {
        Some(amount) => format!("{amount} APT"),
        None => NOT_SPECIFIED.to_string(),
    }
}

fn render_team(proposal: &ProposalInput) -> String {
    if proposal.team.is_empty() {
        return NOT_SPECIFIED.to_string();
    }

    proposal
        .team
        .iter()
        .enumerate()
        .map(|(idx, member)| {
            format!(
                "{}. {} - {}\n   Bio: {}\n   Wallet: {}\n   Commitment: {}",
                idx + 1,
                member.name,
                member.role,
                or_placeholder(member.bio.as_deref()),
                or_placeholder(member.wallet.as_deref()),
                or_placeholder(member.time_commitment.as_deref()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_milestones(proposal: &ProposalInput) -> String {
    if proposal.milestones.is_empty() {
        return NOT_SPECIFIED.to_string();
    }

    proposal
        .milestones
        .iter()
        .enumerate()
        .map(|(idx, milestone)| {
            let deliverables = if milestone.deliverables.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                milestone.deliverables.join(", ")
            };
            let duration = milestone
                .duration_days
                .map(|days| format!("{days} days"))
                .unwrap_or_else(|| NOT_SPECIFIED.to_string());

            format!(
                "{}. {}\n   Description: {}\n   Deliverables: {}\n   Funding Amount: {}\n   Duration: {}\n   Success Criteria: {}",
                idx + 1,
                milestone.title,
                or_placeholder(Some(milestone.description.as_str())),
                deliverables,
                amount(milestone.funding_amount),
                duration,
                or_placeholder(milestone.success_criteria.as_deref()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_budget(proposal: &ProposalInput) -> String {
    if proposal.budget_breakdown.is_empty() {
        return NOT_SPECIFIED.to_string();
    }

    proposal
        .budget_breakdown
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            format!(
                "{}. {}: {} APT\n   Description: {}\n   Justification: {}",
                idx + 1,
                item.category,
                item.amount,
                or_placeholder(Some(item.description.as_str())),
                or_placeholder(item.justification.as_deref()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_rubric() -> String {
    Criterion::ALL
        .iter()
        .enumerate()
        .map(|(idx, criterion)| {
            let (question, considerations) = rubric(*criterion);
            let bullets = considerations
                .iter()
                .map(|line| format!("- {line}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "### {}. {} (`{}`, 0-100)\n{}\nConsider:\n{}",
                idx + 1,
                criterion.title(),
                criterion.key(),
                question,
                bullets
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_output_schema() -> String {
    let scores = Criterion::ALL
        .iter()
        .map(|c| format!("    \"{}\": <integer 0-100>", c.key()))
        .collect::<Vec<_>>()
        .join(",\n");
    let reasoning = Criterion::ALL
        .iter()
        .map(|c| format!("    \"{}\": \"<2-3 sentences>\"", c.key()))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"{{
  "scores": {{
{scores}
  }},
  "reasoning": {{
{reasoning}
  }},
  "strengths": ["<string>"],
  "weaknesses": ["<string>"],
  "opportunities": ["<string>"],
  "threats": ["<string>"],
  "missingInformation": ["<string>"],
  "clarificationQuestions": ["<string>"],
  "overallAssessment": "<3-4 sentences summarizing the evaluation>"
}}"#
    )
}

/// Build the evaluation prompt for a proposal.
///
/// Every section is always present; empty optional fields render as [`NOT_SPECIFIED`].
pub fn build_evaluation_prompt(proposal: &ProposalInput) -> String {
    format!(
        r#"Evaluate the following AptoCom DAO proposal using EXACTLY the 8 criteria below.
Score each criterion from 0 to 100 and justify every score.

## Proposal

Title: {title}
Sector: {sector}
Amount Requested: {amount}

### Description
{description}

### Team Members
{team}

### Milestones
{milestones}

### Budget Breakdown
{budget}

### Additional Information
- Risks & Mitigation: {risks}
- Success Metrics: {success_metrics}
- Timeline: {timeline}

---

## Evaluation Criteria

{rubric}

---

## Required Output

Respond with a single raw JSON object (no markdown code fences) with exactly this structure:

{schema}

All scores must be integers between 0 and 100. Be objective, thorough and constructive."#,
        title = or_placeholder(Some(proposal.title.as_str())),
        sector = or_placeholder(proposal.sector.as_deref()),
        amount = amount(proposal.amount_requested),
        description = or_placeholder(Some(proposal.description.as_str())),
        team = render_team(proposal),
        milestones = render_milestones(proposal),
        budget = render_budget(proposal),
        risks = or_placeholder(proposal.risks.as_deref()),
        success_metrics = or_placeholder(proposal.success_metrics.as_deref()),
        timeline = or_placeholder(proposal.timeline.as_deref()),
        rubric = render_rubric(),
        schema = render_output_schema(),
    )
}
