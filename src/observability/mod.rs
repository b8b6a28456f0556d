//! # Observability Infrastructure
//!
//! Structured logging, request tracing and metrics for the PassKeeper server.

pub mod http_tracing;
pub mod logging;
pub mod metrics;

pub use http_tracing::trace_http_requests;
pub use logging::{init_logging, log_config_info};
pub use metrics::init_metrics;

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging and, when configured, the metrics exporter
pub fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    let logging_installed = init_logging(config)?;
    let metrics_enabled = init_metrics(config)?;

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        logging_installed,
        metrics_enabled,
        "Observability initialized"
    );

    Ok(())
}
