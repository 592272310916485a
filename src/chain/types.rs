//! Chain boundary types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One price update as the contract receives it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub symbol: String,
    /// Price scaled by 10^18
    pub price: u128,
}

/// Commit result for a batch transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReceipt {
    /// Transaction committed with status 1
    pub success: bool,
    pub gas_used: u64,
    /// Price paid per gas unit, when reported
    pub effective_gas_price: Option<u128>,
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
    /// Failure detail for unsuccessful receipts
    pub error: Option<String>,
}

impl BatchReceipt {
    pub fn succeeded(gas_used: u64) -> Self {
        Self {
            success: true,
            gas_used,
            effective_gas_price: None,
            tx_hash: None,
            block_number: None,
            error: None,
        }
    }

    pub fn failed(gas_used: u64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            gas_used,
            effective_gas_price: None,
            tx_hash: None,
            block_number: None,
            error: Some(error.into()),
        }
    }

    /// Total cost in ETH, when the effective gas price is known
    pub fn cost_eth(&self) -> Option<Decimal> {
        let price = self.effective_gas_price?;
        let wei = u128::from(self.gas_used).checked_mul(price)?;
        let wei = i128::try_from(wei).ok()?;
        Decimal::try_from_i128_with_scale(wei, 18).ok()
    }
}

/// Network status shown at startup and in periodic stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub block_number: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Signer balance in wei
    pub balance: u128,
}

impl NetworkInfo {
    /// Signer balance in ETH
    pub fn balance_eth(&self) -> Decimal {
        i128::try_from(self.balance)
            .ok()
            .and_then(|wei| Decimal::try_from_i128_with_scale(wei, 18).ok())
            .unwrap_or(Decimal::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cost_eth() {
        let mut receipt = BatchReceipt::succeeded(1_000_000);
        assert_eq!(receipt.cost_eth(), None);

        receipt.effective_gas_price = Some(20_000_000_000);
        assert_eq!(receipt.cost_eth(), Some(dec!(0.02)));
    }

    #[test]
    fn test_failed_receipt() {
        let receipt = BatchReceipt::failed(21_000, "reverted");
        assert!(!receipt.success);
        assert_eq!(receipt.error.as_deref(), Some("reverted"));
    }

    #[test]
    fn test_balance_eth() {
        let info = NetworkInfo {
            chain_id: 11155111,
            block_number: 1,
            gas_price: 1,
            balance: 5_000_000_000_000_000,
        };
        assert_eq!(info.balance_eth(), dec!(0.005));
    }
}
