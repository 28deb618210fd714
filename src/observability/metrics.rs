//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by method, route template, status
//! - `relay_request_duration_seconds` (histogram): latency distribution
//! - `relay_rate_limited_total` (counter): refused by admission control
//! - `relay_validation_failures_total` (counter): rejected bodies
//! - `relay_notifications_total` (counter): delivery attempts by outcome
//! - `relay_tracked_clients` (gauge): identities with a live counter
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "relay_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("relay_rate_limited_total").increment(1);
}

pub fn record_validation_failure() {
    counter!("relay_validation_failures_total").increment(1);
}

pub fn record_notification(outcome: &'static str) {
    counter!("relay_notifications_total", "outcome" => outcome).increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("relay_tracked_clients").set(count as f64);
}
