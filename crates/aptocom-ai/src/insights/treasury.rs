use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ensure_percentage, InsightError};
use crate::evaluation::completion::{CompletionClient, CompletionOptions, CompletionRequest};
use crate::evaluation::parser::decode_payload;
use crate::evaluation::retry::{with_retry, RetryPolicy};

pub const TREASURY_INSIGHTS_LABEL: &str = "Treasury insights generation";

const TREASURY_SYSTEM_PROMPT: &str =
    "You are a treasury management expert. Respond with valid JSON only.";

const TREASURY_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.3,
    max_tokens: 2000,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryTransaction {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

/// Point-in-time treasury figures, APT-denominated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasurySnapshot {
    pub current_balance: f64,
    pub monthly_burn_rate: f64,
    pub runway_months: f64,
    pub total_allocated: f64,
    pub total_spent: f64,
    #[serde(default)]
    pub recent_transactions: Vec<TreasuryTransaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreasuryHealth {
    Healthy,
    Concerning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryInsights {
    pub health_status: TreasuryHealth,
    pub health_score: u8,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

pub(crate) fn build_treasury_prompt(snapshot: &TreasurySnapshot) -> String {
    let transactions = if snapshot.recent_transactions.is_empty() {
        "No recent transactions".to_string()
    } else {
        snapshot
            .recent_transactions
            .iter()
            .map(|tx| format!("- {}: {} APT ({})", tx.kind, tx.amount, tx.description))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Assess the health of the AptoCom DAO treasury.

## Treasury Data

Current Balance: {balance} APT
Monthly Burn Rate: {burn} APT
Runway: {runway} months
Total Allocated: {allocated} APT
Total Spent: {spent} APT

## Recent Transactions
{transactions}

## Required Output

Respond with a single JSON object:

{{
  "healthStatus": "healthy" | "concerning" | "critical",
  "healthScore": <integer 0-100>,
  "insights": ["<string>"],
  "recommendations": ["<string>"],
  "risks": ["<string>"],
  "opportunities": ["<string>"]
}}"#,
        balance = snapshot.current_balance,
        burn = snapshot.monthly_burn_rate,
        runway = snapshot.runway_months,
        allocated = snapshot.total_allocated,
        spent = snapshot.total_spent,
    )
}

pub async fn generate_treasury_insights<C>(
    client: &C,
    retry: &RetryPolicy,
    snapshot: &TreasurySnapshot,
) -> Result<TreasuryInsights, InsightError>
where
    C: CompletionClient + ?Sized,
{
    let request = CompletionRequest::new(
        TREASURY_SYSTEM_PROMPT,
        build_treasury_prompt(snapshot),
        TREASURY_OPTIONS,
    );
    let completion = with_retry(retry, TREASURY_INSIGHTS_LABEL, || client.complete(&request)).await?;
    if completion.is_empty() {
        return Err(InsightError::EmptyResponse);
    }

    let insights: TreasuryInsights = decode_payload(&completion.text, "treasuryInsights")?;
    ensure_percentage("healthScore", insights.health_score)?;

    info!(
        health = ?insights.health_status,
        score = insights.health_score,
        "treasury insights generated"
    );
    Ok(insights)
}
