//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_resolutions_total` (counter): resolutions by outcome and app
//! - `dispatch_resolution_duration_seconds` (histogram): resolve + load latency
//! - `dispatch_config_reloads_total` (counter): reloads by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch attempt.
pub fn record_resolution(outcome: &'static str, app: &str, start: Instant) {
    metrics::counter!(
        "dispatch_resolutions_total",
        "outcome" => outcome,
        "app" => app.to_string()
    )
    .increment(1);
    metrics::histogram!("dispatch_resolution_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_config_reload(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("dispatch_config_reloads_total", "result" => result).increment(1);
}
