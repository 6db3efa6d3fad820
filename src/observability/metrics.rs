//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_upstream_requests_total` (counter): upstream calls by operation, outcome
//! - `relay_upstream_request_duration_seconds` (histogram): upstream latency by operation
//! - `relay_inbound_rejections_total` (counter): requests answered without an upstream call
//! - `relay_mock_sessions` (gauge): live sessions in the mock server
//!
//! Recording is a no-op until a recorder is installed, so tests and the mock
//! server can call these freely.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_upstream_request(operation: &'static str, outcome: &'static str, start: Instant) {
    counter!("relay_upstream_requests_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    histogram!("relay_upstream_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rejection(reason: &'static str) {
    counter!("relay_inbound_rejections_total", "reason" => reason).increment(1);
}

pub fn record_mock_sessions(count: usize) {
    gauge!("relay_mock_sessions").set(count as f64);
}
