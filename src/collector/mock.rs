//! Random-walk price source
//!
//! Used for dry runs and as the degraded fallback when the live source
//! returns nothing. Prices wander around realistic NGX base prices with
//! mild mean reversion, so consecutive cycles see small, trending moves.

use super::{select_symbols, Observation, PriceCollector};
use crate::error::CollectionError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;

/// Symbols used when the primary source yields nothing
pub const DEFAULT_FALLBACK_SYMBOLS: [&str; 5] = ["DANGCEM", "GTCO", "BUACEMENT", "MTNN", "ACCESSCORP"];

/// NGX stocks with base prices in naira
const BASE_PRICES: [(&str, Decimal); 15] = [
    ("DANGCEM", dec!(450.50)),
    ("GTCO", dec!(48.75)),
    ("BUACEMENT", dec!(168.60)),
    ("MTNN", dec!(285.00)),
    ("AIRTELAFRI", dec!(2310.50)),
    ("ZENITHBANK", dec!(42.30)),
    ("FBNH", dec!(28.95)),
    ("SEPLAT", dec!(4520.00)),
    ("ACCESSCORP", dec!(27.65)),
    ("BUAFOODS", dec!(588.00)),
    ("TRANSCORP", dec!(14.50)),
    ("OANDO", dec!(95.00)),
    ("STANBIC", dec!(68.50)),
    ("UBA", dec!(32.50)),
    ("NESTLE", dec!(1250.00)),
];

/// Weight of the base price in each step's mean reversion
const REVERSION_WEIGHT: Decimal = dec!(0.05);

struct WalkState {
    rng: StdRng,
    last_prices: HashMap<&'static str, Decimal>,
}

/// Random-walk collector over a fixed NGX universe
pub struct MockCollector {
    /// Maximum step size as a fraction (0.02 = ±2%)
    volatility: Decimal,
    state: Mutex<WalkState>,
}

impl MockCollector {
    /// Create a collector seeded from OS entropy
    pub fn new(volatility: Decimal) -> Self {
        Self::with_rng(volatility, StdRng::from_entropy())
    }

    /// Create a deterministic collector
    pub fn seeded(volatility: Decimal, seed: u64) -> Self {
        Self::with_rng(volatility, StdRng::seed_from_u64(seed))
    }

    fn with_rng(volatility: Decimal, rng: StdRng) -> Self {
        Self {
            volatility: volatility.abs(),
            state: Mutex::new(WalkState {
                rng,
                last_prices: HashMap::new(),
            }),
        }
    }

    /// Base price for a known symbol
    pub fn base_price(symbol: &str) -> Option<Decimal> {
        BASE_PRICES
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, p)| *p)
    }

    /// Advance the walk for every known symbol, in table order
    fn step_all(&self) -> Vec<Observation> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Step size drawn in basis points of the current price
        let max_bps = (self.volatility * dec!(10000)).trunc().to_i64().unwrap_or(0);

        BASE_PRICES
            .iter()
            .map(|(symbol, base)| {
                let current = state.last_prices.get(symbol).copied().unwrap_or(*base);
                let bps = if max_bps > 0 {
                    state.rng.gen_range(-max_bps..=max_bps)
                } else {
                    0
                };
                let stepped = current * (Decimal::ONE + Decimal::new(bps, 4));
                let next = stepped * (Decimal::ONE - REVERSION_WEIGHT) + *base * REVERSION_WEIGHT;
                state.last_prices.insert(*symbol, next);

                let price = next.round_dp(2);
                Observation::new(*symbol, price, "mock").with_change((price - *base).round_dp(2))
            })
            .collect()
    }
}

impl Default for MockCollector {
    fn default() -> Self {
        Self::new(dec!(0.02))
    }
}

#[async_trait]
impl PriceCollector for MockCollector {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<Observation>, CollectionError> {
        let observations = select_symbols(self.step_all(), symbols);
        tracing::debug!(count = observations.len(), "Generated mock observations");
        Ok(observations)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_all_symbols() {
        let collector = MockCollector::seeded(dec!(0.02), 7);
        let obs = collector.fetch(&[]).await.unwrap();

        assert_eq!(obs.len(), 15);
        assert_eq!(obs[0].symbol, "DANGCEM");
        assert!(obs.iter().all(|o| o.source == "mock"));
    }

    #[tokio::test]
    async fn test_fetch_subset_in_table_order() {
        let collector = MockCollector::seeded(dec!(0.02), 7);
        let obs = collector.fetch(&symbols(&["MTNN", "GTCO", "UNKNOWN"])).await.unwrap();

        let got: Vec<_> = obs.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(got, vec!["GTCO", "MTNN"]);
    }

    #[tokio::test]
    async fn test_prices_stay_near_base() {
        let collector = MockCollector::seeded(dec!(0.02), 42);
        for _ in 0..50 {
            let obs = collector.fetch(&symbols(&["DANGCEM"])).await.unwrap();
            let price = obs[0].price;
            assert!(price > dec!(300) && price < dec!(600), "price drifted to {price}");
        }
    }

    #[tokio::test]
    async fn test_zero_volatility_reverts_to_base() {
        let collector = MockCollector::seeded(dec!(0), 1);
        let obs = collector.fetch(&symbols(&["GTCO"])).await.unwrap();
        assert_eq!(obs[0].price, dec!(48.75));
        assert_eq!(obs[0].change, Some(dec!(0)));
    }

    #[tokio::test]
    async fn test_seeded_walks_are_reproducible() {
        let a = MockCollector::seeded(dec!(0.02), 99);
        let b = MockCollector::seeded(dec!(0.02), 99);
        let pa: Vec<_> = a.fetch(&[]).await.unwrap().into_iter().map(|o| o.price).collect();
        let pb: Vec<_> = b.fetch(&[]).await.unwrap().into_iter().map(|o| o.price).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_base_price_lookup() {
        assert_eq!(MockCollector::base_price("seplat"), Some(dec!(4520.00)));
        assert_eq!(MockCollector::base_price("NOPE"), None);
    }
}
