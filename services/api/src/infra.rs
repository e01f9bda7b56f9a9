use marketplace_margin::config::StorageConfig;
use marketplace_margin::service::PricingService;
use marketplace_margin::store::{JsonFileCalculationRepository, JsonFileRuleStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type FilePricingService =
    PricingService<JsonFileRuleStore, JsonFileCalculationRepository>;

/// Service backed by the JSON documents under the configured data directory.
pub(crate) fn file_backed_service(storage: &StorageConfig) -> FilePricingService {
    PricingService::new(
        Arc::new(JsonFileRuleStore::new(storage.rules_path())),
        Arc::new(JsonFileCalculationRepository::new(
            storage.calculations_path(),
        )),
    )
}

pub(crate) fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}R$ {:.2}", value.abs())
}

pub(crate) fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}
