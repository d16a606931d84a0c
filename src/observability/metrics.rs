//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_breaker_state` (gauge): 0=closed, 1=open, 2=half_open
//! - `gateway_breaker_transitions_total` (counter): state transitions by target state
//! - `gateway_breaker_rejections_total` (counter): calls rejected while open

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and scrape endpoint. Must run inside the
/// Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    if let Err(err) = builder.install() {
        tracing::error!(error = %err, "failed to install metrics exporter");
        return;
    }

    describe_counter!(
        "gateway_requests_total",
        "Proxied requests by method, status and service"
    );
    describe_histogram!(
        "gateway_request_duration_seconds",
        "Request latency distribution per service"
    );
    describe_gauge!(
        "gateway_breaker_state",
        "Current breaker state per service (0=closed, 1=open, 2=half_open)"
    );
    describe_counter!(
        "gateway_breaker_transitions_total",
        "Circuit breaker state transitions by target state"
    );
    describe_counter!(
        "gateway_breaker_rejections_total",
        "Requests rejected while the circuit was open"
    );

    tracing::info!(address = %addr, "metrics exporter listening");
}

pub fn record_request(method: &str, status: u16, service: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "service" => service.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "service" => service.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_breaker_transition(service: &str, to: &'static str) {
    counter!(
        "gateway_breaker_transitions_total",
        "service" => service.to_string(),
        "to" => to
    )
    .increment(1);

    let value = match to {
        "open" => 1.0,
        "half_open" => 2.0,
        _ => 0.0,
    };
    gauge!("gateway_breaker_state", "service" => service.to_string()).set(value);
}

pub fn record_breaker_rejection(service: &str) {
    counter!(
        "gateway_breaker_rejections_total",
        "service" => service.to_string()
    )
    .increment(1);
}
