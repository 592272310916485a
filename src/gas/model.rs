//! Linear gas estimate for batch transactions

use serde::{Deserialize, Serialize};

/// `base_overhead + count * per_item_cost`, deliberately generous so a
/// batch never runs out of gas. Composition is decided before any network
/// round trip, so no live simulation is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearGasModel {
    /// Fixed per-transaction overhead
    pub base_overhead: u64,
    /// Cost of one price update inside the batch
    pub per_item_cost: u64,
}

impl Default for LinearGasModel {
    fn default() -> Self {
        Self {
            base_overhead: 200_000,
            per_item_cost: 150_000,
        }
    }
}

impl LinearGasModel {
    pub fn new(base_overhead: u64, per_item_cost: u64) -> Self {
        Self {
            base_overhead,
            per_item_cost,
        }
    }

    /// Uncapped estimate for a batch of `count` items
    pub fn estimate(&self, count: usize) -> u64 {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        self.base_overhead
            .saturating_add(count.saturating_mul(self.per_item_cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_estimate() {
        let model = LinearGasModel::default();
        assert_eq!(model.estimate(1), 350_000);
        assert_eq!(model.estimate(20), 3_200_000);
    }

    #[test]
    fn test_estimate_zero_items_is_overhead() {
        let model = LinearGasModel::new(21_000, 50_000);
        assert_eq!(model.estimate(0), 21_000);
    }

    #[test]
    fn test_estimate_saturates() {
        let model = LinearGasModel::new(u64::MAX - 1, u64::MAX);
        assert_eq!(model.estimate(3), u64::MAX);
    }
}
