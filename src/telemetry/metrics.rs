//! Prometheus metrics

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Price collection call
    Fetch,
    /// Batch submission until commit result
    Submission,
    /// Whole cycle
    Cycle,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    CyclesRun,
    CyclesFailed,
    BatchesSucceeded,
    BatchesFailed,
    /// Batches skipped by the gas ceiling
    BatchesSkipped,
    SymbolsUpdated,
    /// Cycles served by the degraded collector
    FallbackCollections,
    GasUsed,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Symbols with a confirmed on-chain price
    TrackedSymbols,
    /// Last observed network gas price
    GasPriceGwei,
    /// Signer balance at last network query
    BalanceEth,
    /// Update candidates in the last cycle
    PendingCandidates,
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::Fetch => "oracle_keeper_fetch_latency_seconds",
            LatencyMetric::Submission => "oracle_keeper_submission_latency_seconds",
            LatencyMetric::Cycle => "oracle_keeper_cycle_duration_seconds",
        }
    }
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::CyclesRun => "oracle_keeper_cycles_total",
            CounterMetric::CyclesFailed => "oracle_keeper_cycles_failed_total",
            CounterMetric::BatchesSucceeded => "oracle_keeper_batches_succeeded_total",
            CounterMetric::BatchesFailed => "oracle_keeper_batches_failed_total",
            CounterMetric::BatchesSkipped => "oracle_keeper_batches_skipped_total",
            CounterMetric::SymbolsUpdated => "oracle_keeper_symbols_updated_total",
            CounterMetric::FallbackCollections => "oracle_keeper_fallback_collections_total",
            CounterMetric::GasUsed => "oracle_keeper_gas_used_total",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::TrackedSymbols => "oracle_keeper_tracked_symbols",
            GaugeMetric::GasPriceGwei => "oracle_keeper_gas_price_gwei",
            GaugeMetric::BalanceEth => "oracle_keeper_balance_eth",
            GaugeMetric::PendingCandidates => "oracle_keeper_pending_candidates",
        }
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    ::metrics::histogram!(metric.name()).record(duration.as_secs_f64());
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    ::metrics::counter!(metric.name()).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}

/// Serve `/metrics` on `port`. Requires a running tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}
