//! Cycle scheduling
//!
//! Runs cycles one at a time, absorbs cycle-level errors and keeps the
//! cumulative [`CycleStats`].

use super::coordinator::SubmissionCoordinator;
use super::sleep_or_shutdown;
use super::stats::{CycleReport, CycleStats};
use crate::telemetry::{self, CounterMetric};
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;

pub struct KeeperRunner {
    coordinator: SubmissionCoordinator,
    stats: CycleStats,
    /// Delay between the end of one cycle and the start of the next
    interval: Duration,
    /// Log statistics every N cycles; 0 disables periodic logging
    stats_every: u64,
    shutdown: watch::Receiver<bool>,
}

impl KeeperRunner {
    pub fn new(
        coordinator: SubmissionCoordinator,
        interval: Duration,
        stats_every: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            coordinator: coordinator.with_shutdown(shutdown.clone()),
            stats: CycleStats::default(),
            interval,
            stats_every,
            shutdown,
        }
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn coordinator(&self) -> &SubmissionCoordinator {
        &self.coordinator
    }

    /// Run a single cycle and merge its outcome. Cycle errors are logged and
    /// counted, never returned.
    pub async fn run_once(&mut self) -> Option<CycleReport> {
        telemetry::increment(CounterMetric::CyclesRun, 1);

        match self.coordinator.run_cycle().await {
            Ok(report) => {
                self.stats.record(&report);
                Some(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Update cycle failed");
                telemetry::increment(CounterMetric::CyclesFailed, 1);
                self.stats.record_failure(Utc::now());
                None
            }
        }
    }

    /// Run cycles until shutdown is requested
    pub async fn run_forever(&mut self) -> &CycleStats {
        tracing::info!(
            interval_mins = self.interval.as_secs() / 60,
            "Starting continuous price updates"
        );

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let cancelled = self
                .run_once()
                .await
                .map(|report| report.cancelled)
                .unwrap_or(false);

            if self.stats_every > 0 && self.stats.cycles_run % self.stats_every == 0 {
                self.stats.log_summary(self.coordinator.memory().len());
            }

            if cancelled {
                break;
            }

            tracing::info!(next_in_secs = self.interval.as_secs(), "Waiting for next cycle");
            if sleep_or_shutdown(self.interval, &mut self.shutdown).await {
                break;
            }
        }

        tracing::info!("Keeper stopped");
        self.stats.log_summary(self.coordinator.memory().len());
        &self.stats
    }
}
