//! Gas pricing and estimation
//!
//! - [`GasGate`]: per-batch ceiling on the network gas price
//! - [`LinearGasModel`]: pre-submission gas limit estimate for a batch

mod gate;
mod model;

pub use gate::{display_gwei, gwei_f64, gwei_to_wei, wei_to_gwei, GasGate, GasVerdict};
pub use model::LinearGasModel;
