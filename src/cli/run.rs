//! Run command implementation

use super::setup::{build_chain, build_collector, report_network};
use crate::collector::{MockCollector, PriceCollector};
use crate::config::Config;
use crate::keeper::{shutdown_on_ctrl_c, KeeperRunner, SubmissionCoordinator};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Use generated prices instead of the exchange
    #[arg(long)]
    pub mock: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if self.mock {
            config.collector.use_mock = true;
        }
        config.validate()?;

        let chain = build_chain(&config)?;
        report_network(chain.as_ref(), &config).await;

        let collector = build_collector(&config)?;
        let mut coordinator = SubmissionCoordinator::from_config(&config, collector, chain);
        if !config.collector.use_mock {
            let fallback: Arc<dyn PriceCollector> =
                Arc::new(MockCollector::new(config.collector.mock_volatility));
            coordinator = coordinator.with_fallback(fallback);
        }

        let mut runner = KeeperRunner::new(
            coordinator,
            Duration::from_secs(config.keeper.update_interval_minutes * 60),
            config.keeper.stats_every_cycles,
            shutdown_on_ctrl_c(),
        );

        if self.once {
            tracing::info!("Running single update cycle");
            let report = runner.run_once().await;
            runner
                .stats()
                .log_summary(runner.coordinator().memory().len());
            if report.is_none() {
                anyhow::bail!("update cycle failed");
            }
        } else {
            runner.run_forever().await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_once_paper_mock() {
        let mut config = Config::default();
        config.keeper.inter_batch_delay_ms = 0;
        config.keeper.symbols = vec!["DANGCEM".into(), "MTNN".into()];

        let args = RunArgs {
            once: true,
            mock: true,
        };
        args.execute(&config).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_config() {
        let mut config = Config::default();
        config.keeper.batch_size = 0;

        let args = RunArgs {
            once: true,
            mock: true,
        };
        assert!(args.execute(&config).await.is_err());
    }
}
