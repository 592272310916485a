//! Batch construction
//!
//! Splits update candidates into ordered, size- and gas-bounded
//! transaction batches.

mod batcher;
mod types;

pub use batcher::{make_batches, Batcher};
pub use types::Batch;
