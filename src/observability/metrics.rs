//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by command, status
//! - `gateway_request_duration_seconds` (histogram): parse to response built
//! - `gateway_interceptor_short_circuits_total` (counter): by phase
//! - `gateway_final_phase_failures_total` (counter): errors and panics in FINAL
//! - `gateway_serialization_failures_total` (counter)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::interceptors::Phase;

/// Install the Prometheus recorder and its scrape listener on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(command: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "command" => command.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_short_circuit(phase: Phase) {
    ::metrics::counter!(
        "gateway_interceptor_short_circuits_total",
        "phase" => phase.as_str()
    )
    .increment(1);
}

pub fn record_final_failure() {
    ::metrics::counter!("gateway_final_phase_failures_total").increment(1);
}

pub fn record_serialization_failure() {
    ::metrics::counter!("gateway_serialization_failures_total").increment(1);
}
