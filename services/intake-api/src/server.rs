use crate::cli::ServeArgs;
use crate::infra::{AppState, BlobUrlRegistry, FixtureReferenceLookup, LoggingSubmissionSink};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use overseas_intake::config::AppConfig;
use overseas_intake::error::AppError;
use overseas_intake::telemetry;
use overseas_intake::workflows::intake::{IntakeSession, IntakeWizard, SystemClock};
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

    let wizard = IntakeWizard::new(
        Arc::new(BlobUrlRegistry::default()),
        Arc::new(LoggingSubmissionSink::default()),
        config.intake.attachment_policy(),
        config.intake.catalogs.clone(),
        Arc::new(SystemClock),
    );
    let session = Arc::new(IntakeSession::new(
        wizard,
        Arc::new(FixtureReferenceLookup),
    ));

    let app = with_service_routes(session)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_attachment_bytes = config.intake.max_attachment_bytes,
        "overseas intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
