use conveyancing_costs::api::CostCalculatorService;
use conveyancing_costs::config::AppConfig;
use conveyancing_costs::delivery::{Api2PdfClient, BrevoClient};
use conveyancing_costs::error::AppError;
use conveyancing_costs::settings::{
    FileSettingsStore, InMemorySettingsStore, PdfSettings, SettingsStore,
};
use conveyancing_costs::tables::{
    self, CostTableStore, FileCostTableStore, InMemoryCostTableStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires stores and provider clients from configuration.
///
/// With `APP_DATA_DIR` set, tables and settings survive restarts as JSON snapshots.
pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<CostCalculatorService>, AppError> {
    let defaults = PdfSettings::from_config(&config.delivery);

    let (tables, settings): (Arc<dyn CostTableStore>, Arc<dyn SettingsStore>) =
        match &config.storage.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                info!(data_dir = %dir.display(), "persisting cost tables and settings");
                (
                    Arc::new(FileCostTableStore::open(dir)?),
                    Arc::new(FileSettingsStore::open(dir, defaults)?),
                )
            }
            None => {
                warn!("APP_DATA_DIR not set; cost tables and settings are kept in memory");
                (
                    Arc::new(InMemoryCostTableStore::new()),
                    Arc::new(InMemorySettingsStore::new(defaults)),
                )
            }
        };

    let delivery = &config.delivery;
    let pdf = Api2PdfClient::new(delivery.api2pdf_base_url.clone(), delivery.timeout)?;
    let email = BrevoClient::new(delivery.brevo_base_url.clone(), delivery.timeout)?;

    Ok(Arc::new(CostCalculatorService::new(
        tables,
        settings,
        Arc::new(pdf),
        Arc::new(email),
    )))
}

/// Parses a command-line amount such as `600000`, `1,250,000.00` or `R 600 000`.
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let amount = tables::parse_amount(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as an amount"))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(format!("'{raw}' must not be negative"));
    }
    Ok(amount)
}
