use aptocom_ai::config::AppConfig;
use aptocom_ai::error::AppError;
use aptocom_ai::evaluation::{
    EvaluationServiceError, EvaluatorSettings, GroqClient, ProposalEvaluator, ProposalInput,
    ScoringConfig, ScoringEngine,
};
use aptocom_ai::telemetry;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Path to a JSON proposal document
    #[arg(long, value_name = "FILE")]
    pub(crate) proposal: PathBuf,
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let scoring = ScoringConfig::default();
    scoring.validate()?;

    let raw = std::fs::read_to_string(&args.proposal)?;
    let proposal: ProposalInput = serde_json::from_str(&raw)?;
    info!(proposal = %proposal.id, path = %args.proposal.display(), "evaluating proposal from file");

    let evaluator = ProposalEvaluator::new(
        GroqClient::new(&config.ai),
        ScoringEngine::new(scoring),
        EvaluatorSettings::from(&config.ai),
    );
    let evaluation = evaluator
        .evaluate(&proposal)
        .await
        .map_err(EvaluationServiceError::from)?;

    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}
