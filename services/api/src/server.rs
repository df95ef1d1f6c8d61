use crate::cli::ServeArgs;
use crate::infra::{demo_directory, demo_records, AppState};
use crate::routes::with_submission_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use trackademic::config::{AppConfig, AppEnvironment};
use trackademic::error::AppError;
use trackademic::telemetry;
use trackademic::workflows::submissions::{
    InMemorySubmissionStore, SubmissionApi, SubmissionService,
};
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

    let store = InMemorySubmissionStore::new(config.workspace.app_id.clone());
    if config.environment != AppEnvironment::Production {
        store.seed(demo_records())?;
    }
    let collection = store.collection_path();
    let records = store.len();

    let service = Arc::new(SubmissionService::new(
        Arc::new(store),
        &config.workspace,
    ));
    info!(
        %collection,
        records,
        policy = ?service.review_policy(),
        "submission store ready"
    );
    let api = Arc::new(SubmissionApi::new(service, Arc::new(demo_directory())));

    let app = with_submission_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, app = %config.workspace.app_name, "submission service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
