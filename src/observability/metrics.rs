//! # Metrics Collection
//!
//! Counters and histograms recorded through the `metrics` facade. Without an
//! installed exporter every call is a no-op, so recording is always safe.

use crate::config::ObservabilityConfig;
use crate::errors::{PassKeeperError, Result};
use ::tracing::info;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

pub const AUTH_ATTEMPTS_TOTAL: &str = "passkeeper_auth_attempts_total";
pub const SECRET_OPERATIONS_TOTAL: &str = "passkeeper_secret_operations_total";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Start the Prometheus exporter when a metrics port is configured.
///
/// Returns whether an exporter was installed.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<bool> {
    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => return Ok(false),
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        PassKeeperError::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| {
            PassKeeperError::config(format!("Failed to initialize metrics exporter: {}", e))
        })?;

    describe_metrics();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );
    Ok(true)
}

fn describe_metrics() {
    describe_counter!(AUTH_ATTEMPTS_TOTAL, Unit::Count, "Registration and login attempts");
    describe_counter!(SECRET_OPERATIONS_TOTAL, Unit::Count, "Secret reads, writes and deletes");
    describe_counter!(HTTP_REQUESTS_TOTAL, Unit::Count, "HTTP requests served");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "HTTP request latency in seconds"
    );
}

/// Record an authentication attempt (`register_success`, `invalid_credentials`, ...)
pub fn record_auth_attempt(outcome: &'static str) {
    counter!(AUTH_ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a secret operation and its outcome.
pub fn record_secret_operation(operation: &'static str, outcome: &'static str) {
    counter!(SECRET_OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
        .increment(1);
}

/// Record a served HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration);
}
