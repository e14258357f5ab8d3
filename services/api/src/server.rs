use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEvaluationRepository};
use crate::routes::with_evaluation_routes;
use aptocom_ai::config::AppConfig;
use aptocom_ai::error::AppError;
use aptocom_ai::evaluation::{
    EvaluationService, EvaluatorSettings, GroqClient, ProposalEvaluator, ScoringConfig,
    ScoringEngine,
};
use aptocom_ai::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let scoring = ScoringConfig::default();
    scoring.validate()?;

    if config.ai.api_key.is_none() {
        warn!("GROQ_API_KEY is not set; evaluation requests will fail");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let evaluator = ProposalEvaluator::new(
        GroqClient::new(&config.ai),
        ScoringEngine::new(scoring),
        EvaluatorSettings::from(&config.ai),
    );
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let evaluation_service = Arc::new(EvaluationService::new(evaluator, repository));

    let app = with_evaluation_routes(evaluation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, model = %config.ai.model, "proposal evaluation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
