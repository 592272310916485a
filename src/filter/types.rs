//! Update candidate types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a symbol needs publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateReason {
    /// Never published, or last published price was zero
    New,
    /// Moved at least the configured threshold since last publication
    Changed,
}

impl fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateReason::New => write!(f, "NEW"),
            UpdateReason::Changed => write!(f, "CHANGED"),
        }
    }
}

/// A symbol selected for publication this cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCandidate {
    /// Ticker symbol
    pub symbol: String,
    /// Price to publish
    pub price: Decimal,
    /// Selection reason
    pub reason: UpdateReason,
    /// Last published price, if any
    pub previous: Option<Decimal>,
    /// Absolute move in percent from `previous` (only for `Changed`)
    pub change_pct: Option<Decimal>,
}

impl UpdateCandidate {
    /// Candidate for a symbol with no usable previous price
    pub fn new_symbol(symbol: impl Into<String>, price: Decimal, previous: Option<Decimal>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            reason: UpdateReason::New,
            previous,
            change_pct: None,
        }
    }

    /// Candidate for a symbol that moved past the threshold
    pub fn changed(
        symbol: impl Into<String>,
        price: Decimal,
        previous: Decimal,
        change_pct: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            reason: UpdateReason::Changed,
            previous: Some(previous),
            change_pct: Some(change_pct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reason_display() {
        assert_eq!(UpdateReason::New.to_string(), "NEW");
        assert_eq!(UpdateReason::Changed.to_string(), "CHANGED");
    }

    #[test]
    fn test_changed_candidate_carries_context() {
        let c = UpdateCandidate::changed("DANGCEM", dec!(455), dec!(450), dec!(1.11));
        assert_eq!(c.reason, UpdateReason::Changed);
        assert_eq!(c.previous, Some(dec!(450)));
        assert_eq!(c.change_pct, Some(dec!(1.11)));
    }
}
