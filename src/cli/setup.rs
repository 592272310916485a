//! Component wiring shared by the commands

use crate::chain::{load_abi, ChainClient, NetworkInfo, PaperChain, RpcChainClient, RpcConfig};
use crate::collector::{MockCollector, NgxConfig, NgxScraper, PriceCollector};
use crate::config::{Config, ExecutionMode};
use crate::error::SubmissionError;
use crate::gas::{display_gwei, gwei_to_wei};
use crate::telemetry::{self, GaugeMetric};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::Duration;

/// Bound on the startup network status query
const NETWORK_INFO_TIMEOUT: Duration = Duration::from_secs(30);

/// Chain client for the configured execution mode
pub fn build_chain(config: &Config) -> anyhow::Result<Arc<dyn ChainClient>> {
    match config.execution.mode {
        ExecutionMode::Paper => {
            tracing::info!(
                gas_price_gwei = config.execution.paper_gas_price_gwei,
                "Paper mode: transactions are simulated"
            );
            Ok(Arc::new(PaperChain::new(gwei_to_wei(
                config.execution.paper_gas_price_gwei,
            ))))
        }
        ExecutionMode::Live => {
            let abi = load_abi(&config.chain.abi_path)?;
            tracing::info!(
                path = %config.chain.abi_path.display(),
                contract = ?abi.contract_name,
                "Loaded contract ABI"
            );

            let client = RpcChainClient::connect(&RpcConfig {
                rpc_url: config.chain.rpc_url.clone(),
                private_key: config.chain.private_key.expose().to_string(),
                contract_address: config.chain.contract_address.clone(),
                receipt_timeout: Duration::from_secs(config.chain.receipt_timeout_secs),
            })?;
            Ok(Arc::new(client))
        }
    }
}

/// Primary price source
pub fn build_collector(config: &Config) -> anyhow::Result<Arc<dyn PriceCollector>> {
    if config.collector.use_mock {
        tracing::info!("Using mock price data");
        return Ok(Arc::new(MockCollector::new(config.collector.mock_volatility)));
    }

    let scraper = NgxScraper::with_config(NgxConfig {
        urls: config.collector.urls.clone(),
        request_timeout: Duration::from_secs(config.collector.request_timeout_secs),
        max_price: config.collector.max_price,
        ..Default::default()
    })?;
    Ok(Arc::new(scraper))
}

/// Log network status and warn on a low signer balance
pub async fn report_network(chain: &dyn ChainClient, config: &Config) -> Option<NetworkInfo> {
    let status = tokio::time::timeout(NETWORK_INFO_TIMEOUT, chain.network_info())
        .await
        .unwrap_or(Err(SubmissionError::Transport(format!(
            "no answer within {NETWORK_INFO_TIMEOUT:?}"
        ))));

    match status {
        Ok(info) => {
            let balance_eth = info.balance_eth();
            tracing::info!(
                chain_id = info.chain_id,
                block = info.block_number,
                gas_price = %display_gwei(info.gas_price),
                balance_eth = %balance_eth.round_dp(6),
                "Connected to network"
            );
            telemetry::set_gauge(GaugeMetric::BalanceEth, balance_eth.to_f64().unwrap_or_default());

            if balance_eth < config.chain.low_balance_eth {
                tracing::warn!(
                    balance_eth = %balance_eth,
                    floor_eth = %config.chain.low_balance_eth,
                    "Low balance, transactions may fail"
                );
            }
            Some(info)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not query network info");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{BatchReceipt, PriceUpdate};
    use async_trait::async_trait;

    /// Chain whose RPC never answers
    struct UnresponsiveChain;

    #[async_trait]
    impl ChainClient for UnresponsiveChain {
        async fn current_gas_price(&self) -> Result<u128, SubmissionError> {
            std::future::pending().await
        }

        async fn submit_batch(
            &self,
            _items: &[PriceUpdate],
            _gas_limit: u64,
            _gas_price: u128,
        ) -> Result<BatchReceipt, SubmissionError> {
            std::future::pending().await
        }

        async fn network_info(&self) -> Result<NetworkInfo, SubmissionError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_network_gives_up_on_hung_rpc() {
        let started = tokio::time::Instant::now();
        let info = report_network(&UnresponsiveChain, &Config::default()).await;

        assert!(info.is_none());
        let elapsed = started.elapsed();
        assert!(elapsed >= NETWORK_INFO_TIMEOUT && elapsed < NETWORK_INFO_TIMEOUT * 2);
    }

    #[tokio::test]
    async fn test_paper_chain_from_config() {
        let mut config = Config::default();
        config.execution.paper_gas_price_gwei = 7;

        let chain = build_chain(&config).unwrap();
        assert_eq!(chain.current_gas_price().await.unwrap(), gwei_to_wei(7));

        let info = report_network(chain.as_ref(), &config).await.unwrap();
        assert_eq!(info.gas_price, gwei_to_wei(7));
    }

    #[test]
    fn test_live_chain_requires_abi() {
        let mut config = Config::default();
        config.execution.mode = ExecutionMode::Live;
        config.chain.abi_path = "/nonexistent/Oracle.json".into();
        assert!(build_chain(&config).is_err());
    }

    #[tokio::test]
    async fn test_mock_collector_from_config() {
        let mut config = Config::default();
        config.collector.use_mock = true;

        let collector = build_collector(&config).unwrap();
        assert_eq!(collector.name(), "mock");
        let observations = collector.fetch(&["GTCO".to_string()]).await.unwrap();
        assert_eq!(observations.len(), 1);
    }

    #[test]
    fn test_scraper_from_config() {
        let collector = build_collector(&Config::default()).unwrap();
        assert_eq!(collector.name(), "ngx");
    }
}
