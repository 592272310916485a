//! Change detection
//!
//! Decides which fresh observations differ enough from the last published
//! price to be worth an on-chain update.

mod change;
mod types;

pub use change::{change_percent, ChangeFilter};
pub use types::{UpdateCandidate, UpdateReason};
