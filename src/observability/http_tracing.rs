//! # HTTP Request Tracing Middleware
//!
//! Axum middleware that wraps each request in a span, logs its outcome and
//! records request metrics.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn, Instrument};

use crate::observability::metrics;

/// Axum middleware that logs method, path, status and latency for each request
pub async fn trace_http_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let span = crate::request_span!(method, path);
    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let elapsed = start.elapsed();

    span.in_scope(|| {
        if status >= 500 {
            warn!(status, elapsed_ms = elapsed.as_millis() as u64, "request failed");
        } else {
            info!(status, elapsed_ms = elapsed.as_millis() as u64, "request completed");
        }
    });

    metrics::record_http_request(
        &method,
        &normalize_path_for_metrics(&path),
        status,
        elapsed.as_secs_f64(),
    );

    response
}

/// Replace numeric path segments with `:id` to bound metric cardinality.
fn normalize_path_for_metrics(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
