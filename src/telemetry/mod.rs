//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::{env_filter, init_logging};
pub use metrics::{
    increment, init_metrics, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};

use crate::config::TelemetryConfig;
use tracing_appender::non_blocking::WorkerGuard;

/// Guard that flushes buffered log output on drop
pub struct TelemetryGuard {
    _log_file: Option<WorkerGuard>,
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let log_file = init_logging(config)?;

    if let Some(path) = &config.log_file {
        tracing::info!(path = %path.display(), "Logging to file");
    }

    if let Some(port) = config.metrics_port {
        init_metrics(port)?;
    }

    Ok(TelemetryGuard {
        _log_file: log_file,
    })
}
