//! Order-preserving batcher

use super::Batch;
use crate::filter::UpdateCandidate;
use crate::gas::LinearGasModel;

/// Partition `candidates` into consecutive chunks of at most `batch_size`.
///
/// Each batch's gas is `min(gas_model(len), max_gas_cap)`. A `batch_size`
/// of zero is treated as one.
pub fn make_batches<F>(
    candidates: Vec<UpdateCandidate>,
    batch_size: usize,
    gas_model: F,
    max_gas_cap: u64,
) -> Vec<Batch>
where
    F: Fn(usize) -> u64,
{
    let batch_size = batch_size.max(1);
    let total = candidates.len().div_ceil(batch_size);

    let mut batches = Vec::with_capacity(total);
    let mut items = candidates.into_iter().peekable();

    while items.peek().is_some() {
        let chunk: Vec<UpdateCandidate> = items.by_ref().take(batch_size).collect();
        let estimated_gas = gas_model(chunk.len()).min(max_gas_cap);
        batches.push(Batch {
            index: batches.len() + 1,
            total,
            items: chunk,
            estimated_gas,
        });
    }

    batches
}

/// Batcher configured with a size ceiling and a linear gas model
#[derive(Debug, Clone)]
pub struct Batcher {
    batch_size: usize,
    gas_model: LinearGasModel,
    max_gas_cap: u64,
}

impl Batcher {
    pub fn new(batch_size: usize, gas_model: LinearGasModel, max_gas_cap: u64) -> Self {
        Self {
            batch_size: batch_size.max(1),
            gas_model,
            max_gas_cap,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn make_batches(&self, candidates: Vec<UpdateCandidate>) -> Vec<Batch> {
        let model = self.gas_model;
        make_batches(
            candidates,
            self.batch_size,
            |count| model.estimate(count),
            self.max_gas_cap,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn candidates(n: usize) -> Vec<UpdateCandidate> {
        (0..n)
            .map(|i| UpdateCandidate::new_symbol(format!("SYM{i}"), Decimal::from(i as u64 + 1), None))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let batcher = Batcher::new(20, LinearGasModel::default(), 8_000_000);
        assert!(batcher.make_batches(vec![]).is_empty());
    }

    #[test]
    fn test_batch_size_one() {
        let batcher = Batcher::new(1, LinearGasModel::default(), 8_000_000);
        let batches = batcher.make_batches(candidates(2));

        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 1));
        assert_eq!(batches[0].index, 1);
        assert_eq!(batches[1].index, 2);
        assert!(batches[1].is_last());
    }

    #[test]
    fn test_remainder_goes_to_last_batch() {
        let batcher = Batcher::new(20, LinearGasModel::default(), 8_000_000);
        let batches = batcher.make_batches(candidates(45));

        let sizes: Vec<_> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![20, 20, 5]);
        assert!(batches.iter().all(|b| b.total == 3));
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let input = candidates(17);
        let batcher = Batcher::new(4, LinearGasModel::default(), 8_000_000);
        let batches = batcher.make_batches(input.clone());

        let flattened: Vec<UpdateCandidate> =
            batches.into_iter().flat_map(|b| b.items).collect();
        assert_eq!(flattened, input);
    }

    #[test]
    fn test_gas_estimate_per_batch() {
        let batcher = Batcher::new(20, LinearGasModel::default(), 8_000_000);
        let batches = batcher.make_batches(candidates(25));

        assert_eq!(batches[0].estimated_gas, 3_200_000);
        assert_eq!(batches[1].estimated_gas, 950_000);
    }

    #[test]
    fn test_gas_capped() {
        let batcher = Batcher::new(100, LinearGasModel::default(), 8_000_000);
        let batches = batcher.make_batches(candidates(60));

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].estimated_gas, 8_000_000);
    }

    #[test]
    fn test_zero_batch_size_treated_as_one() {
        let batches = make_batches(candidates(3), 0, |n| n as u64, u64::MAX);
        assert_eq!(batches.len(), 3);
    }

    #[test]
    fn test_custom_gas_model() {
        let batches = make_batches(candidates(5), 2, |n| 1_000 * n as u64, 1_500);
        let gas: Vec<_> = batches.iter().map(|b| b.estimated_gas).collect();
        assert_eq!(gas, vec![1_500, 1_500, 1_000]);
    }

    #[test]
    fn test_bounds_hold_for_many_shapes() {
        let model = LinearGasModel::default();
        for n in 0..40 {
            for size in 1..8 {
                let input = candidates(n);
                let batches = make_batches(input.clone(), size, |c| model.estimate(c), 1_000_000);
                assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
                assert!(batches.iter().all(|b| b.estimated_gas <= 1_000_000));
                let flattened: Vec<_> = batches.into_iter().flat_map(|b| b.items).collect();
                assert_eq!(flattened, input);
            }
        }
    }
}
