//! Live JSON-RPC chain client
//!
//! Signs `updatePrices(string[],uint256[])` transactions with a local key and
//! waits for their receipts. Nonce and chain id are filled by the provider;
//! gas limit and gas price are set explicitly per batch.

use super::{BatchReceipt, ChainClient, NetworkInfo, PriceUpdate};
use crate::error::{ConfigError, SubmissionError};
use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use std::time::Duration;

sol! {
    #[sol(rpc)]
    contract StockOracle {
        function updatePrices(string[] calldata symbols, uint256[] calldata prices) external;
    }
}

/// Connection settings for the live client
#[derive(Clone)]
pub struct RpcConfig {
    pub rpc_url: String,
    pub private_key: String,
    pub contract_address: String,
    /// Bounded wait for a receipt after broadcast
    pub receipt_timeout: Duration,
}

impl std::fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"***")
            .field("contract_address", &self.contract_address)
            .field("receipt_timeout", &self.receipt_timeout)
            .finish()
    }
}

/// Chain client backed by an HTTP JSON-RPC endpoint
pub struct RpcChainClient {
    provider: DynProvider,
    oracle: StockOracle::StockOracleInstance<DynProvider>,
    signer_address: Address,
    receipt_timeout: Duration,
}

impl RpcChainClient {
    /// Build the client. Performs no network I/O.
    pub fn connect(config: &RpcConfig) -> Result<Self, ConfigError> {
        let url: Url = config
            .rpc_url
            .parse()
            .map_err(|e| ConfigError::Invalid(vec![format!("RPC_URL is not a valid URL: {e}")]))?;

        let signer: PrivateKeySigner = config
            .private_key
            .trim()
            .parse()
            .map_err(|e| ConfigError::Credentials(format!("PRIVATE_KEY rejected: {e}")))?;
        let signer_address = signer.address();

        let contract_address: Address = config.contract_address.parse().map_err(|e| {
            ConfigError::Invalid(vec![format!("ORACLE_CONTRACT_ADDRESS is not an address: {e}")])
        })?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        let oracle = StockOracle::new(contract_address, provider.clone());

        tracing::info!(
            contract = %contract_address,
            account = %signer_address,
            "Oracle contract client ready"
        );

        Ok(Self {
            provider,
            oracle,
            signer_address,
            receipt_timeout: config.receipt_timeout,
        })
    }

    pub fn signer_address(&self) -> Address {
        self.signer_address
    }
}

fn transport<E: std::fmt::Display>(e: E) -> SubmissionError {
    SubmissionError::Transport(e.to_string())
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn current_gas_price(&self) -> Result<u128, SubmissionError> {
        self.provider.get_gas_price().await.map_err(transport)
    }

    async fn submit_batch(
        &self,
        items: &[PriceUpdate],
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<BatchReceipt, SubmissionError> {
        let symbols: Vec<String> = items.iter().map(|u| u.symbol.clone()).collect();
        let prices: Vec<U256> = items.iter().map(|u| U256::from(u.price)).collect();

        let pending = self
            .oracle
            .updatePrices(symbols, prices)
            .gas(gas_limit)
            .gas_price(gas_price)
            .send()
            .await
            .map_err(transport)?;

        let tx_hash = pending.tx_hash().to_string();
        tracing::info!(tx_hash = %tx_hash, items = items.len(), "Batch transaction sent");

        let receipt = tokio::time::timeout(self.receipt_timeout, pending.get_receipt())
            .await
            .map_err(|_| SubmissionError::Timeout(self.receipt_timeout))?
            .map_err(transport)?;

        let mut result = if receipt.status() {
            BatchReceipt::succeeded(receipt.gas_used())
        } else {
            BatchReceipt::failed(receipt.gas_used(), "transaction reverted")
        };
        result.effective_gas_price = Some(receipt.effective_gas_price());
        result.tx_hash = Some(tx_hash);
        result.block_number = receipt.block_number();

        Ok(result)
    }

    async fn network_info(&self) -> Result<NetworkInfo, SubmissionError> {
        let chain_id = self.provider.get_chain_id().await.map_err(transport)?;
        let block_number = self.provider.get_block_number().await.map_err(transport)?;
        let gas_price = self.provider.get_gas_price().await.map_err(transport)?;
        let balance = self
            .provider
            .get_balance(self.signer_address)
            .await
            .map_err(transport)?;

        Ok(NetworkInfo {
            chain_id,
            block_number,
            gas_price,
            balance: u128::try_from(balance).unwrap_or(u128::MAX),
        })
    }
}
