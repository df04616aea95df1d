use crate::cli::ServeArgs;
use crate::infra::{seed_from_sheets, AppState, InMemoryRenewalStore, LoggingDispatcher};
use crate::routes::with_renewal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use renewdesk::config::AppConfig;
use renewdesk::error::AppError;
use renewdesk::renewals::NotificationEngine;
use renewdesk::telemetry;
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

    let store = Arc::new(InMemoryRenewalStore::default());
    let (customers, policies) =
        seed_from_sheets(&store, args.customers.as_deref(), args.policies.as_deref())?;
    if customers > 0 || policies > 0 {
        info!(customers, policies, "seeded store from sheet exports");
    }

    let dispatcher = Arc::new(LoggingDispatcher);
    let engine = Arc::new(NotificationEngine::new(
        store,
        dispatcher,
        config.notify.clone(),
    ));

    let app = with_renewal_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "renewal reminder service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
