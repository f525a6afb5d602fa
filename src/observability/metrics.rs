//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_hop_total` (counter): hop attempts by hop and result
//! - `relay_hop_duration_seconds` (histogram): hop latency
//! - `relay_requests_total` (counter): inbound relay requests by status
//! - `relay_request_duration_seconds` (histogram): inbound latency
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::Hop;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_address = %addr, "Prometheus metrics exporter enabled");
    Ok(())
}

/// Record one finished hop.
pub fn record_hop(hop: Hop, result: &'static str, started: Instant) {
    metrics::counter!("relay_hop_total", "hop" => hop.as_str(), "result" => result).increment(1);
    metrics::histogram!("relay_hop_duration_seconds", "hop" => hop.as_str())
        .record(started.elapsed().as_secs_f64());
}

/// Record one inbound relay request.
pub fn record_request(status: u16, started: Instant) {
    metrics::counter!("relay_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("relay_request_duration_seconds").record(started.elapsed().as_secs_f64());
}
