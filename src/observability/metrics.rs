//! Metrics collection and exposition.
//!
//! # Metrics
//! - `editor_proxy_requests_total` (counter): proxied requests by result kind and status
//! - `editor_proxy_request_duration_seconds` (histogram): end-to-end pipeline latency
//! - `editor_proxy_upstream_duration_seconds` (histogram): upstream fetch latency
//! - `editor_proxy_framework_detections_total` (counter): classifications by framework
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the Prometheus exporter.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished pipeline request.
pub fn record_request(kind: &'static str, status: u16, start_time: Instant) {
    metrics::counter!(
        "editor_proxy_requests_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("editor_proxy_request_duration_seconds", "kind" => kind)
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_upstream_duration(elapsed: Duration) {
    metrics::histogram!("editor_proxy_upstream_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_framework(framework: &'static str) {
    metrics::counter!("editor_proxy_framework_detections_total", "framework" => framework).increment(1);
}
