use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_cost_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use conveyancing_costs::api::AdminGuard;
use conveyancing_costs::config::AppConfig;
use conveyancing_costs::error::AppError;
use conveyancing_costs::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.admin.token.is_none() {
        warn!("APP_ADMIN_TOKEN not set; staff endpoints will reject every request");
    }

    let service = build_service(&config)?;
    let guard = AdminGuard::new(config.admin.token.clone());

    let app = with_cost_routes(service, guard)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "conveyancing cost calculator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
