//! Observation types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single price sample for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Ticker symbol (e.g., "DANGCEM")
    pub symbol: String,
    /// Observed price in the quote currency
    pub price: Decimal,
    /// When the sample was taken
    pub observed_at: DateTime<Utc>,
    /// Source-reported change, if any
    pub change: Option<Decimal>,
    /// Source label (e.g., "ngx", "mock")
    pub source: String,
}

impl Observation {
    /// Create an observation stamped now
    pub fn new(symbol: impl Into<String>, price: Decimal, source: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            observed_at: Utc::now(),
            change: None,
            source: source.into(),
        }
    }

    pub fn with_change(mut self, change: Decimal) -> Self {
        self.change = Some(change);
        self
    }
}
