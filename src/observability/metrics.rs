//! Metrics collection and exposition.
//!
//! # Metrics
//! - `docdb_requests_total` (counter): requests by method, status
//! - `docdb_request_duration_seconds` (histogram): latency distribution
//! - `docdb_faults_total` (counter): faults by class
//! - `docdb_unsafe_rejections_total` (counter): requests refused by the safety gate
//! - `docdb_traffic_watch_listeners` (gauge): registered listeners
//! - `docdb_traffic_watch_lagged_total` (counter): events dropped for slow listeners
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter only when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("docdb_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("docdb_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fault(class: &'static str) {
    counter!("docdb_faults_total", "class" => class).increment(1);
}

pub fn record_unsafe_rejection() {
    counter!("docdb_unsafe_rejections_total").increment(1);
}

pub fn set_traffic_watch_listeners(count: usize) {
    gauge!("docdb_traffic_watch_listeners").set(count as f64);
}

pub fn record_traffic_watch_lagged(skipped: u64) {
    counter!("docdb_traffic_watch_lagged_total").increment(skipped);
}
