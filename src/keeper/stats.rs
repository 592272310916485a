//! Per-cycle reports and cumulative statistics

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// How one batch ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Committed; memory updated for every item
    Succeeded {
        gas_used: u64,
        tx_hash: Option<String>,
    },
    /// Failure receipt, transport error or timeout
    Failed { gas_used: u64, reason: String },
    /// Gas ceiling rejected the batch before submission
    Skipped { gas_price: u128, max_gas_price: u128 },
}

/// Result of a single cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Observations the filter saw
    pub observations: usize,
    /// Observations came from the degraded collector
    pub used_fallback: bool,
    pub candidates: usize,
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Batches left untouched because of shutdown
    pub not_attempted: usize,
    pub symbols_updated: usize,
    pub gas_used: u64,
    /// Outcome per attempted batch, in submission order
    pub outcomes: Vec<BatchOutcome>,
    pub duration: Duration,
    /// Shutdown interrupted the cycle between batches
    pub cancelled: bool,
}

impl CycleReport {
    pub fn new(cycle_id: Uuid) -> Self {
        Self {
            cycle_id,
            started_at: Utc::now(),
            observations: 0,
            used_fallback: false,
            candidates: 0,
            batches: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            not_attempted: 0,
            symbols_updated: 0,
            gas_used: 0,
            outcomes: vec![],
            duration: Duration::ZERO,
            cancelled: false,
        }
    }

    /// Count a finished batch of `items` updates
    pub fn record_batch(&mut self, items: usize, outcome: BatchOutcome) {
        match &outcome {
            BatchOutcome::Succeeded { gas_used, .. } => {
                self.succeeded += 1;
                self.symbols_updated += items;
                self.gas_used = self.gas_used.saturating_add(*gas_used);
            }
            BatchOutcome::Failed { gas_used, .. } => {
                self.failed += 1;
                self.gas_used = self.gas_used.saturating_add(*gas_used);
            }
            BatchOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Every batch was attempted and committed
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0 && self.not_attempted == 0
    }
}

/// Running totals since startup
#[derive(Debug, Clone, Serialize)]
pub struct CycleStats {
    pub started_at: DateTime<Utc>,
    pub cycles_run: u64,
    pub cycles_failed: u64,
    pub batches_succeeded: u64,
    pub batches_failed: u64,
    pub batches_skipped: u64,
    pub symbols_updated: u64,
    pub gas_used: u64,
    pub fallback_cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl CycleStats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            cycles_run: 0,
            cycles_failed: 0,
            batches_succeeded: 0,
            batches_failed: 0,
            batches_skipped: 0,
            symbols_updated: 0,
            gas_used: 0,
            fallback_cycles: 0,
            last_cycle_at: None,
        }
    }

    /// Merge a completed cycle
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles_run += 1;
        self.batches_succeeded += report.succeeded as u64;
        self.batches_failed += report.failed as u64;
        self.batches_skipped += report.skipped as u64;
        self.symbols_updated += report.symbols_updated as u64;
        self.gas_used = self.gas_used.saturating_add(report.gas_used);
        if report.used_fallback {
            self.fallback_cycles += 1;
        }
        self.last_cycle_at = Some(report.started_at);
    }

    /// Count a cycle that ended with an error
    pub fn record_failure(&mut self, at: DateTime<Utc>) {
        self.cycles_run += 1;
        self.cycles_failed += 1;
        self.last_cycle_at = Some(at);
    }

    pub fn uptime(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.started_at
    }

    /// Share of attempted batches that committed, in percent
    pub fn batch_success_rate(&self) -> Option<f64> {
        let attempted = self.batches_succeeded + self.batches_failed;
        if attempted == 0 {
            None
        } else {
            Some(self.batches_succeeded as f64 / attempted as f64 * 100.0)
        }
    }

    /// Log a summary at info level
    pub fn log_summary(&self, tracked_symbols: usize) {
        let uptime = self.uptime(Utc::now());
        tracing::info!(
            uptime_mins = uptime.num_minutes(),
            cycles = self.cycles_run,
            failed_cycles = self.cycles_failed,
            batches_ok = self.batches_succeeded,
            batches_failed = self.batches_failed,
            batches_skipped = self.batches_skipped,
            symbols_updated = self.symbols_updated,
            gas_used = self.gas_used,
            success_rate = ?self.batch_success_rate(),
            tracked_symbols,
            "Keeper statistics"
        );
    }
}
