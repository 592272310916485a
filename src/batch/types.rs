//! Batch types

use crate::filter::UpdateCandidate;
use serde::{Deserialize, Serialize};

/// One transaction's worth of price updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// 1-based position within the cycle
    pub index: usize,
    /// Number of batches in the cycle
    pub total: usize,
    /// Updates in filter order
    pub items: Vec<UpdateCandidate>,
    /// Gas limit to submit with
    pub estimated_gas: u64,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index == self.total
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|c| c.symbol.as_str())
    }
}
