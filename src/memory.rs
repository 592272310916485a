//! Last-published price memory
//!
//! Holds what the keeper believes the oracle contract currently stores.
//! Records are only written after a batch is confirmed on-chain and are
//! never removed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last confirmed on-chain price for one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Ticker symbol
    pub symbol: String,
    /// Price committed by the last successful batch
    pub last_price: Decimal,
    /// When that batch was confirmed
    pub updated_at: DateTime<Utc>,
}

/// In-memory store of last published prices, keyed by symbol
#[derive(Debug, Default, Clone)]
pub struct PriceMemory {
    records: HashMap<String, PriceRecord>,
}

impl PriceMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published price, or `None` if the symbol was never published
    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.records.get(symbol).map(|r| r.last_price)
    }

    /// Overwrite the record for `symbol`
    pub fn set(&mut self, symbol: impl Into<String>, price: Decimal, at: DateTime<Utc>) {
        let symbol = symbol.into();
        self.records.insert(
            symbol.clone(),
            PriceRecord {
                symbol,
                last_price: price,
                updated_at: at,
            },
        );
    }

    /// Full record for `symbol`
    pub fn record(&self, symbol: &str) -> Option<&PriceRecord> {
        self.records.get(symbol)
    }

    /// Number of symbols ever published
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Published symbols, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.records.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}
