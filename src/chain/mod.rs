//! Oracle contract access
//!
//! Handles batch submission to the on-chain price oracle (paper and live
//! modes). Prices cross this boundary as 18-decimal fixed-point integers.

mod abi;
mod paper;
mod rpc;
mod scale;
mod types;

pub use abi::{load_abi, ContractAbi, UPDATE_PRICES_FN};
pub use paper::{PaperChain, SubmittedBatch};
pub use rpc::{RpcChainClient, RpcConfig};
pub use scale::{from_fixed_point, to_fixed_point, PRICE_DECIMALS};
pub use types::{BatchReceipt, NetworkInfo, PriceUpdate};

use crate::error::SubmissionError;
use async_trait::async_trait;

/// Trait for chain client implementations
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current network gas price in wei
    async fn current_gas_price(&self) -> Result<u128, SubmissionError>;

    /// Submit one batch-update transaction at `gas_price` wei and wait for
    /// its commit result
    async fn submit_batch(
        &self,
        items: &[PriceUpdate],
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<BatchReceipt, SubmissionError>;

    /// Chain id, head block, gas price and signer balance
    async fn network_info(&self) -> Result<NetworkInfo, SubmissionError>;
}
