//! Keeper core
//!
//! - [`SubmissionCoordinator`]: one collect → filter → batch → submit cycle
//! - [`KeeperRunner`]: single-shot and looping schedules with statistics
//! - [`KeeperState`]: cycle state machine

mod coordinator;
mod runner;
mod state;
mod stats;

pub use coordinator::{CoordinatorConfig, SubmissionCoordinator};
pub use runner::KeeperRunner;
pub use state::KeeperState;
pub use stats::{BatchOutcome, CycleReport, CycleStats};

use std::time::Duration;
use tokio::sync::watch;

/// Shutdown flag flipped on Ctrl-C
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received, finishing current batch");
                let _ = tx.send(true);
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
    rx
}

/// Resolves once shutdown is requested. Never resolves if the sender is gone
/// without having requested it.
async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Sleep for `duration`; returns `true` if interrupted by shutdown
pub(crate) async fn sleep_or_shutdown(
    duration: Duration,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown_signalled(shutdown) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_signal() {
        let (_tx, mut rx) = watch::channel(false);
        assert!(!sleep_or_shutdown(Duration::from_secs(5), &mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_with_dropped_sender() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(!sleep_or_shutdown(Duration::from_secs(5), &mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted() {
        let (tx, mut rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            tx.send(true).unwrap();
        });
        let started = tokio::time::Instant::now();
        assert!(sleep_or_shutdown(Duration::from_secs(900), &mut rx).await);
        assert!(started.elapsed() < Duration::from_secs(900));
    }

    #[tokio::test]
    async fn test_already_requested_returns_immediately() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();
        drop(tx);
        assert!(sleep_or_shutdown(Duration::from_secs(3600), &mut rx).await);
    }
}
