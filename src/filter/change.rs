//! Threshold-based change filter

use super::UpdateCandidate;
use crate::collector::Observation;
use crate::memory::PriceMemory;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Absolute percentage move from `old` to `new`.
///
/// Returns `None` when `old` is zero.
pub fn change_percent(old: Decimal, new: Decimal) -> Option<Decimal> {
    if old.is_zero() {
        return None;
    }
    Some(((new - old) / old * dec!(100)).abs())
}

/// Selects observations that need publishing
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    min_change_pct: Decimal,
}

impl ChangeFilter {
    /// Create a filter with the given threshold in percent (0.5 = 0.5%).
    /// Negative thresholds are clamped to zero.
    pub fn new(min_change_pct: Decimal) -> Self {
        Self {
            min_change_pct: min_change_pct.max(Decimal::ZERO),
        }
    }

    pub fn min_change_pct(&self) -> Decimal {
        self.min_change_pct
    }

    /// Produce candidates in observation order
    pub fn filter(&self, observations: &[Observation], memory: &PriceMemory) -> Vec<UpdateCandidate> {
        observations
            .iter()
            .filter_map(|obs| self.evaluate(obs, memory))
            .collect()
    }

    fn evaluate(&self, obs: &Observation, memory: &PriceMemory) -> Option<UpdateCandidate> {
        let Some(old) = memory.get(&obs.symbol) else {
            return Some(UpdateCandidate::new_symbol(&obs.symbol, obs.price, None));
        };

        let Some(pct) = change_percent(old, obs.price) else {
            return Some(UpdateCandidate::new_symbol(&obs.symbol, obs.price, Some(old)));
        };

        if pct >= self.min_change_pct {
            tracing::debug!(
                symbol = %obs.symbol,
                old = %old,
                new = %obs.price,
                change_pct = %pct.round_dp(2),
                "Price moved past threshold"
            );
            Some(UpdateCandidate::changed(&obs.symbol, obs.price, old, pct))
        } else {
            None
        }
    }
}
