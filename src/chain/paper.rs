//! Paper chain client with simulated commits

use super::{BatchReceipt, ChainClient, NetworkInfo, PriceUpdate};
use crate::error::SubmissionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Simulated gas: transaction base plus a storage write per item
const SIMULATED_BASE_GAS: u64 = 45_000;
const SIMULATED_ITEM_GAS: u64 = 52_000;

/// A batch accepted by the paper client
#[derive(Debug, Clone)]
pub struct SubmittedBatch {
    pub items: Vec<PriceUpdate>,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub block_number: u64,
    pub submitted_at: DateTime<Utc>,
}

/// Chain client that commits every batch locally without touching a network
pub struct PaperChain {
    gas_price: Arc<RwLock<u128>>,
    submitted: Arc<RwLock<Vec<SubmittedBatch>>>,
    block_number: AtomicU64,
}

impl PaperChain {
    /// Create a paper client quoting `gas_price` wei
    pub fn new(gas_price: u128) -> Self {
        Self {
            gas_price: Arc::new(RwLock::new(gas_price)),
            submitted: Arc::new(RwLock::new(vec![])),
            block_number: AtomicU64::new(1),
        }
    }

    /// Change the quoted gas price
    pub async fn set_gas_price(&self, gas_price: u128) {
        *self.gas_price.write().await = gas_price;
    }

    /// All batches committed so far
    pub async fn submitted(&self) -> Vec<SubmittedBatch> {
        self.submitted.read().await.clone()
    }

    fn simulated_gas(items: usize) -> u64 {
        SIMULATED_BASE_GAS + SIMULATED_ITEM_GAS * items as u64
    }
}

#[async_trait]
impl ChainClient for PaperChain {
    async fn current_gas_price(&self) -> Result<u128, SubmissionError> {
        Ok(*self.gas_price.read().await)
    }

    async fn submit_batch(
        &self,
        items: &[PriceUpdate],
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<BatchReceipt, SubmissionError> {
        let gas_needed = Self::simulated_gas(items.len());
        let block_number = self.block_number.fetch_add(1, Ordering::Relaxed);

        if gas_needed > gas_limit {
            tracing::warn!(gas_needed, gas_limit, "Paper batch ran out of gas");
            return Ok(BatchReceipt {
                block_number: Some(block_number),
                effective_gas_price: Some(gas_price),
                ..BatchReceipt::failed(gas_limit, "out of gas")
            });
        }

        self.submitted.write().await.push(SubmittedBatch {
            items: items.to_vec(),
            gas_limit,
            gas_price,
            block_number,
            submitted_at: Utc::now(),
        });

        tracing::info!(items = items.len(), block_number, "Paper batch committed");

        Ok(BatchReceipt {
            effective_gas_price: Some(gas_price),
            tx_hash: Some(format!("paper-{block_number}")),
            block_number: Some(block_number),
            ..BatchReceipt::succeeded(gas_needed)
        })
    }

    async fn network_info(&self) -> Result<NetworkInfo, SubmissionError> {
        Ok(NetworkInfo {
            chain_id: 0,
            block_number: self.block_number.load(Ordering::Relaxed),
            gas_price: *self.gas_price.read().await,
            balance: u128::from(u64::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updates(n: usize) -> Vec<PriceUpdate> {
        (0..n)
            .map(|i| PriceUpdate {
                symbol: format!("S{i}"),
                price: 1_000_000_000_000_000_000,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_paper_commit() {
        let chain = PaperChain::new(10_000_000_000);
        let receipt = chain.submit_batch(&updates(2), 500_000, 10_000_000_000).await.unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.gas_used, 149_000);
        assert_eq!(receipt.tx_hash.as_deref(), Some("paper-1"));

        let submitted = chain.submitted().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_paper_out_of_gas() {
        let chain = PaperChain::new(1);
        let receipt = chain.submit_batch(&updates(10), 100_000, 1).await.unwrap();

        assert!(!receipt.success);
        assert_eq!(receipt.error.as_deref(), Some("out of gas"));
        assert!(chain.submitted().await.is_empty());
    }

    #[tokio::test]
    async fn test_paper_gas_price_update() {
        let chain = PaperChain::new(1);
        chain.set_gas_price(42).await;
        assert_eq!(chain.current_gas_price().await.unwrap(), 42);
        assert_eq!(chain.network_info().await.unwrap().gas_price, 42);
    }

    #[tokio::test]
    async fn test_paper_commit_uses_given_gas_price() {
        let chain = PaperChain::new(10);
        chain.set_gas_price(99).await;
        let receipt = chain.submit_batch(&updates(1), 500_000, 10).await.unwrap();

        assert_eq!(receipt.effective_gas_price, Some(10));
        assert_eq!(chain.submitted().await[0].gas_price, 10);
    }
}
