//! oracle-keeper: Publishes changed stock prices to an on-chain price oracle
//!
//! This library provides the core components for:
//! - Price collection from the NGX website, with a random-walk fallback
//! - Change detection against the last confirmed on-chain prices
//! - Gas-bounded batching of price updates
//! - Gas price ceiling per batch
//! - Sequential batch submission (paper and live modes)
//! - Single-shot and looping schedules with cumulative statistics
//! - Structured logging and Prometheus metrics

pub mod batch;
pub mod chain;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod filter;
pub mod gas;
pub mod keeper;
pub mod memory;
pub mod telemetry;
