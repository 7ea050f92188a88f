//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pipeline_transactions_total` (counter): on-chain transactions by outcome
//!   (`submitted`, `confirmed`, `failed`)
//! - `pipeline_http_requests_total` (counter): REST calls by service
//!   (`exchange`, `aggregator`) and HTTP status
//!
//! Without an installed recorder every update is a no-op, so library code
//! records unconditionally.

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one transaction lifecycle event.
pub fn record_transaction(outcome: &'static str) {
    counter!("pipeline_transactions_total", "outcome" => outcome).increment(1);
}

/// Count one REST call against an external service.
pub fn record_http(service: &'static str, status: u16) {
    counter!(
        "pipeline_http_requests_total",
        "service" => service,
        "status" => status.to_string()
    )
    .increment(1);
}
