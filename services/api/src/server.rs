use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_recommendation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gift_ai::clients::{CatalogHttpClient, OpenAiClient};
use gift_ai::config::AppConfig;
use gift_ai::engine::{EngineConfig, RecommendationEngine};
use gift_ai::error::AppError;
use gift_ai::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(CatalogHttpClient::new(&config.collaborators));
    let openai = Arc::new(OpenAiClient::new(&config.collaborators));
    let engine_config = EngineConfig::default().with_collaborator_timing(
        config.collaborators.call_timeout,
        config.collaborators.retry_backoff,
    );
    let engine = Arc::new(RecommendationEngine::new(
        catalog,
        openai.clone(),
        openai,
        engine_config,
    ));

    let app = with_recommendation_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "gift recommendation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
