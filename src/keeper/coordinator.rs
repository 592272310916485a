//! Submission coordinator
//!
//! Drives one cycle: collect, filter against confirmed prices, batch, then
//! submit batches strictly in order behind the gas gate. Per-batch failures
//! are recorded in the [`CycleReport`] and never abort the cycle.

use super::sleep_or_shutdown;
use super::state::KeeperState;
use super::stats::{BatchOutcome, CycleReport};
use crate::batch::{Batch, Batcher};
use crate::chain::{to_fixed_point, ChainClient, PriceUpdate};
use crate::collector::{Observation, PriceCollector};
use crate::config::Config;
use crate::error::{CollectionError, KeeperError, SubmissionError};
use crate::filter::ChangeFilter;
use crate::gas::{display_gwei, gwei_f64, GasGate, GasVerdict, LinearGasModel};
use crate::memory::PriceMemory;
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Margin on top of the receipt wait for signing and broadcast
const SUBMISSION_MARGIN: Duration = Duration::from_secs(30);

/// Bound on the gas price query made before each batch
const GAS_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Coordinator settings
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Symbol universe; empty means everything
    pub symbols: Vec<String>,
    /// Universe for the degraded collector
    pub fallback_symbols: Vec<String>,
    pub fetch_timeout: Duration,
    /// Bound on one batch submission including its commit result
    pub submission_timeout: Duration,
    pub gas_query_timeout: Duration,
    pub inter_batch_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            symbols: vec![],
            fallback_symbols: vec![],
            fetch_timeout: Duration::from_secs(120),
            submission_timeout: Duration::from_secs(300) + SUBMISSION_MARGIN,
            gas_query_timeout: GAS_QUERY_TIMEOUT,
            inter_batch_delay: Duration::from_secs(2),
        }
    }
}

impl CoordinatorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            symbols: config.keeper.symbols.clone(),
            fallback_symbols: config.keeper.fallback_symbols.clone(),
            fetch_timeout: Duration::from_secs(config.keeper.fetch_timeout_secs),
            submission_timeout: Duration::from_secs(config.chain.receipt_timeout_secs)
                + SUBMISSION_MARGIN,
            gas_query_timeout: GAS_QUERY_TIMEOUT,
            inter_batch_delay: Duration::from_millis(config.keeper.inter_batch_delay_ms),
        }
    }
}

/// Owns the price memory and runs cycles against a collector and a chain
pub struct SubmissionCoordinator {
    collector: Arc<dyn PriceCollector>,
    fallback: Option<Arc<dyn PriceCollector>>,
    chain: Arc<dyn ChainClient>,
    memory: PriceMemory,
    filter: ChangeFilter,
    batcher: Batcher,
    gas_gate: GasGate,
    config: CoordinatorConfig,
    state: KeeperState,
    shutdown: watch::Receiver<bool>,
}

impl SubmissionCoordinator {
    pub fn new(
        collector: Arc<dyn PriceCollector>,
        chain: Arc<dyn ChainClient>,
        filter: ChangeFilter,
        batcher: Batcher,
        gas_gate: GasGate,
        config: CoordinatorConfig,
    ) -> Self {
        // A closed channel reads as "never shut down"
        let (_, shutdown) = watch::channel(false);
        Self {
            collector,
            fallback: None,
            chain,
            memory: PriceMemory::new(),
            filter,
            batcher,
            gas_gate,
            config,
            state: KeeperState::Idle,
            shutdown,
        }
    }

    /// Build every component from the loaded configuration
    pub fn from_config(
        config: &Config,
        collector: Arc<dyn PriceCollector>,
        chain: Arc<dyn ChainClient>,
    ) -> Self {
        let gas_model = LinearGasModel::new(config.gas.base_overhead, config.gas.per_item_cost);
        Self::new(
            collector,
            chain,
            ChangeFilter::new(config.keeper.min_price_change_pct),
            Batcher::new(config.keeper.batch_size, gas_model, config.gas.max_gas_cap),
            GasGate::from_gwei(config.gas.max_gas_price_gwei),
            CoordinatorConfig::from_config(config),
        )
    }

    /// Collector consulted when the primary source fails or returns nothing
    pub fn with_fallback(mut self, fallback: Arc<dyn PriceCollector>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Observe `shutdown` between batches and during delays
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Start from previously confirmed prices
    pub fn with_memory(mut self, memory: PriceMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn state(&self) -> KeeperState {
        self.state
    }

    pub fn memory(&self) -> &PriceMemory {
        &self.memory
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    fn transition(&mut self, next: KeeperState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run one full cycle
    pub async fn run_cycle(&mut self) -> Result<CycleReport, KeeperError> {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("cycle", id = %cycle_id);
        self.run_cycle_inner(cycle_id).instrument(span).await
    }

    async fn run_cycle_inner(&mut self, cycle_id: Uuid) -> Result<CycleReport, KeeperError> {
        let started = Instant::now();
        let mut report = CycleReport::new(cycle_id);

        self.state = KeeperState::Idle;
        self.transition(KeeperState::Fetching);

        let (observations, used_fallback) = match self.collect().await {
            Ok(collected) => collected,
            Err(e) => {
                self.transition(KeeperState::Idle);
                return Err(e.into());
            }
        };
        report.observations = observations.len();
        report.used_fallback = used_fallback;

        self.transition(KeeperState::Filtering);
        let candidates = self.filter.filter(&observations, &self.memory);
        report.candidates = candidates.len();
        telemetry::set_gauge(GaugeMetric::PendingCandidates, candidates.len() as f64);

        if candidates.is_empty() {
            tracing::info!(
                observations = report.observations,
                threshold_pct = %self.filter.min_change_pct(),
                "No price changes above threshold"
            );
            self.transition(KeeperState::Done);
            return Ok(self.finish(report, started));
        }

        self.transition(KeeperState::Batching);
        let batches = self.batcher.make_batches(candidates);
        report.batches = batches.len();
        tracing::info!(
            candidates = report.candidates,
            batches = batches.len(),
            batch_size = self.batcher.batch_size(),
            "Prepared update batches"
        );

        let total = batches.len();
        for (i, batch) in batches.iter().enumerate() {
            if self.shutdown_requested() {
                report.cancelled = true;
                report.not_attempted = total - i;
                tracing::warn!(remaining = total - i, "Shutdown requested, stopping submissions");
                break;
            }

            self.transition(KeeperState::Submitting {
                batch: batch.index,
                of: batch.total,
            });
            let outcome = self.submit(batch).await;
            report.record_batch(batch.len(), outcome);

            if !batch.is_last()
                && !self.config.inter_batch_delay.is_zero()
                && sleep_or_shutdown(self.config.inter_batch_delay, &mut self.shutdown).await
            {
                report.cancelled = true;
                report.not_attempted = total - i - 1;
                tracing::warn!(remaining = total - i - 1, "Shutdown requested, stopping submissions");
                break;
            }
        }

        self.transition(KeeperState::Done);
        Ok(self.finish(report, started))
    }

    fn finish(&self, mut report: CycleReport, started: Instant) -> CycleReport {
        report.duration = started.elapsed();
        telemetry::record_latency(LatencyMetric::Cycle, report.duration);
        telemetry::set_gauge(GaugeMetric::TrackedSymbols, self.memory.len() as f64);

        tracing::info!(
            observations = report.observations,
            candidates = report.candidates,
            batches = report.batches,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            not_attempted = report.not_attempted,
            symbols_updated = report.symbols_updated,
            duration_ms = report.duration.as_millis() as u64,
            "Cycle complete"
        );
        report
    }

    /// Fetch from the primary source, falling back to the degraded collector.
    /// Returns the observations and whether the fallback served them.
    async fn collect(&self) -> Result<(Vec<Observation>, bool), CollectionError> {
        let started = Instant::now();
        let primary = fetch_bounded(
            self.collector.as_ref(),
            &self.config.symbols,
            self.config.fetch_timeout,
        )
        .await;
        telemetry::record_latency(LatencyMetric::Fetch, started.elapsed());

        let error = match primary {
            Ok(observations) if !observations.is_empty() => {
                tracing::info!(
                    source = self.collector.name(),
                    count = observations.len(),
                    "Collected prices"
                );
                return Ok((observations, false));
            }
            Ok(_) => CollectionError::NoData,
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            tracing::warn!(source = self.collector.name(), error = %error, "Price collection failed");
            return Err(error);
        };

        tracing::warn!(
            source = self.collector.name(),
            fallback = fallback.name(),
            error = %error,
            "Price collection failed, using fallback data"
        );

        match fetch_bounded(
            fallback.as_ref(),
            &self.config.fallback_symbols,
            self.config.fetch_timeout,
        )
        .await
        {
            Ok(observations) if !observations.is_empty() => {
                telemetry::increment(CounterMetric::FallbackCollections, 1);
                Ok((observations, true))
            }
            Ok(_) => Err(CollectionError::NoData),
            Err(e) => Err(e),
        }
    }

    /// Gate, submit and settle one batch
    async fn submit(&mut self, batch: &Batch) -> BatchOutcome {
        let symbols: Vec<&str> = batch.symbols().collect();

        let gas_price = match tokio::time::timeout(
            self.config.gas_query_timeout,
            self.chain.current_gas_price(),
        )
        .await
        .unwrap_or(Err(SubmissionError::GasQueryTimeout(
            self.config.gas_query_timeout,
        )))
        {
            Ok(price) => price,
            Err(e) => {
                tracing::error!(batch = batch.index, error = %e, "Gas price query failed");
                return self.failed(0, e.to_string());
            }
        };
        let gas_price_display = display_gwei(gas_price);
        telemetry::set_gauge(GaugeMetric::GasPriceGwei, gwei_f64(gas_price));

        if let GasVerdict::Reject { current, max } = self.gas_gate.check(gas_price) {
            tracing::warn!(
                batch = batch.index,
                gas_price = %gas_price_display,
                max = %display_gwei(max),
                "Gas price too high, skipping batch"
            );
            telemetry::increment(CounterMetric::BatchesSkipped, 1);
            return BatchOutcome::Skipped {
                gas_price: current,
                max_gas_price: max,
            };
        }

        let updates = match encode(batch) {
            Ok(updates) => updates,
            Err(e) => {
                tracing::error!(batch = batch.index, error = %e, "Cannot encode batch");
                return self.failed(0, e.to_string());
            }
        };

        tracing::info!(
            batch = batch.index,
            of = batch.total,
            items = batch.len(),
            symbols = ?symbols,
            estimated_gas = batch.estimated_gas,
            gas_price = %gas_price_display,
            "Submitting batch"
        );

        let started = Instant::now();
        let result = tokio::time::timeout(
            self.config.submission_timeout,
            self.chain
                .submit_batch(&updates, batch.estimated_gas, gas_price),
        )
        .await
        .unwrap_or(Err(SubmissionError::Timeout(self.config.submission_timeout)));
        telemetry::record_latency(LatencyMetric::Submission, started.elapsed());

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::error!(batch = batch.index, error = %e, "Batch submission failed");
                return self.failed(0, e.to_string());
            }
        };

        if !receipt.success {
            let reason = receipt
                .error
                .clone()
                .unwrap_or_else(|| "transaction failed".to_string());
            tracing::error!(
                batch = batch.index,
                tx_hash = ?receipt.tx_hash,
                gas_used = receipt.gas_used,
                reason = %reason,
                "Batch transaction failed"
            );
            return self.failed(receipt.gas_used, reason);
        }

        let now = Utc::now();
        for item in &batch.items {
            self.memory.set(item.symbol.clone(), item.price, now);
        }

        let efficiency = if batch.estimated_gas == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(receipt.gas_used) / Decimal::from(batch.estimated_gas)
                * Decimal::ONE_HUNDRED)
                .round_dp(1)
        };
        tracing::info!(
            batch = batch.index,
            tx_hash = ?receipt.tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            gas_efficiency_pct = %efficiency,
            cost_eth = ?receipt.cost_eth(),
            "Batch committed"
        );

        telemetry::increment(CounterMetric::BatchesSucceeded, 1);
        telemetry::increment(CounterMetric::SymbolsUpdated, batch.len() as u64);
        telemetry::increment(CounterMetric::GasUsed, receipt.gas_used);

        BatchOutcome::Succeeded {
            gas_used: receipt.gas_used,
            tx_hash: receipt.tx_hash,
        }
    }

    fn failed(&self, gas_used: u64, reason: String) -> BatchOutcome {
        telemetry::increment(CounterMetric::BatchesFailed, 1);
        if gas_used > 0 {
            telemetry::increment(CounterMetric::GasUsed, gas_used);
        }
        BatchOutcome::Failed { gas_used, reason }
    }
}

async fn fetch_bounded(
    collector: &dyn PriceCollector,
    symbols: &[String],
    timeout: Duration,
) -> Result<Vec<Observation>, CollectionError> {
    tokio::time::timeout(timeout, collector.fetch(symbols))
        .await
        .unwrap_or(Err(CollectionError::Timeout(timeout)))
}

fn encode(batch: &Batch) -> Result<Vec<PriceUpdate>, SubmissionError> {
    batch
        .items
        .iter()
        .map(|c| {
            Ok(PriceUpdate {
                symbol: c.symbol.clone(),
                price: to_fixed_point(&c.symbol, c.price)?,
            })
        })
        .collect()
}
