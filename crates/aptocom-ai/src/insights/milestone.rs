use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ensure_percentage, InsightError};
use crate::evaluation::completion::{CompletionClient, CompletionOptions, CompletionRequest};
use crate::evaluation::domain::Milestone;
use crate::evaluation::parser::decode_payload;
use crate::evaluation::prompts::NOT_SPECIFIED;
use crate::evaluation::retry::{with_retry, RetryPolicy};

pub const MILESTONE_VALIDATION_LABEL: &str = "Milestone validation";

const MILESTONE_SYSTEM_PROMPT: &str =
    "You are a milestone validation expert. Respond with valid JSON only.";

const MILESTONE_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.2,
    max_tokens: 1500,
};

/// Proof submitted by a grantee that a milestone is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneEvidence {
    pub description: String,
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneVerdict {
    ApprovePayment,
    RequestRevision,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneValidation {
    pub is_complete: bool,
    pub completion_score: u8,
    #[serde(default)]
    pub deliverables_met: Vec<String>,
    #[serde(default)]
    pub deliverables_not_met: Vec<String>,
    #[serde(default)]
    pub assessment: String,
    pub recommendation: MilestoneVerdict,
}

pub(crate) fn build_milestone_prompt(milestone: &Milestone, evidence: &MilestoneEvidence) -> String {
    let deliverables = if milestone.deliverables.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        milestone.deliverables.join(", ")
    };
    let links = if evidence.links.is_empty() {
        "No links provided".to_string()
    } else {
        evidence.links.join("\n")
    };
    let funding = milestone
        .funding_amount
        .map(|amount| format!("{amount} APT"))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    format!(
        r#"Decide whether this AptoCom DAO milestone is complete and its deliverables meet the success criteria.

## Milestone

Title: {title}
Description: {description}
Success Criteria: {criteria}
Expected Deliverables: {deliverables}
Funding Amount: {funding}

## Submitted Evidence

{evidence}

Evidence Links:
{links}

## Required Output

Respond with a single JSON object:

{{
  "isComplete": <boolean>,
  "completionScore": <integer 0-100>,
  "deliverablesMet": ["<string>"],
  "deliverablesNotMet": ["<string>"],
  "assessment": "<3-4 sentences>",
  "recommendation": "approve-payment" | "request-revision" | "reject"
}}"#,
        title = milestone.title,
        description = milestone.description,
        criteria = milestone
            .success_criteria
            .as_deref()
            .unwrap_or(NOT_SPECIFIED),
        evidence = evidence.description,
    )
}

pub async fn validate_milestone<C>(
    client: &C,
    retry: &RetryPolicy,
    milestone: &Milestone,
    evidence: &MilestoneEvidence,
) -> Result<MilestoneValidation, InsightError>
where
    C: CompletionClient + ?Sized,
{
    let request = CompletionRequest::new(
        MILESTONE_SYSTEM_PROMPT,
        build_milestone_prompt(milestone, evidence),
        MILESTONE_OPTIONS,
    );
    let completion =
        with_retry(retry, MILESTONE_VALIDATION_LABEL, || client.complete(&request)).await?;
    if completion.is_empty() {
        return Err(InsightError::EmptyResponse);
    }

    let validation: MilestoneValidation = decode_payload(&completion.text, "milestoneValidation")?;
    ensure_percentage("completionScore", validation.completion_score)?;

    info!(
        milestone = %milestone.title,
        complete = validation.is_complete,
        verdict = ?validation.recommendation,
        "milestone validation completed"
    );
    Ok(validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_marks_absent_details() {
        let milestone = Milestone {
            title: "Audit".to_string(),
            description: "Third-party security review".to_string(),
            deliverables: Vec::new(),
            funding_amount: None,
            duration_days: None,
            success_criteria: None,
        };
        let evidence = MilestoneEvidence {
            description: "Report attached".to_string(),
            links: Vec::new(),
        };

        let prompt = build_milestone_prompt(&milestone, &evidence);

        assert!(prompt.contains("Success Criteria: Not specified"));
        assert!(prompt.contains("Expected Deliverables: Not specified"));
        assert!(prompt.contains("Funding Amount: Not specified"));
        assert!(prompt.contains("Evidence Links:\nNo links provided"));
    }
}
