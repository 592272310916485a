//! Price collection
//!
//! Sources of per-symbol price observations:
//! - [`NgxScraper`]: delayed quotes scraped from the NGX website
//! - [`MockCollector`]: random-walk quotes for dry runs and degraded fallback

mod mock;
mod ngx;
mod parser;
mod types;

pub use mock::{MockCollector, DEFAULT_FALLBACK_SYMBOLS};
pub use ngx::{NgxConfig, NgxScraper, NGX_URLS};
pub use parser::{extract_from_html, parse_quotes, ParsedQuote};
pub use types::Observation;

use crate::error::CollectionError;
use async_trait::async_trait;

/// Trait for price source implementations
#[async_trait]
pub trait PriceCollector: Send + Sync {
    /// Fetch observations for `symbols` in source order.
    ///
    /// An empty slice requests every symbol the source publishes. Symbols
    /// the source cannot resolve are omitted.
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<Observation>, CollectionError>;

    /// Source name for logs
    fn name(&self) -> &str;
}

/// Keep observations whose symbol is in `symbols` (all when empty), first
/// occurrence wins, source order preserved.
pub(crate) fn select_symbols(observations: Vec<Observation>, symbols: &[String]) -> Vec<Observation> {
    let mut seen = std::collections::HashSet::new();
    observations
        .into_iter()
        .filter(|o| symbols.is_empty() || symbols.iter().any(|s| s.eq_ignore_ascii_case(&o.symbol)))
        .filter(|o| seen.insert(o.symbol.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_select_all_when_universe_empty() {
        let obs = vec![
            Observation::new("B", dec!(2), "test"),
            Observation::new("A", dec!(1), "test"),
        ];
        let selected = select_symbols(obs, &[]);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].symbol, "B");
    }

    #[test]
    fn test_select_filters_and_dedupes() {
        let obs = vec![
            Observation::new("GTCO", dec!(48.75), "test"),
            Observation::new("MTNN", dec!(285), "test"),
            Observation::new("GTCO", dec!(49.00), "test"),
        ];
        let selected = select_symbols(obs, &["gtco".to_string()]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].price, dec!(48.75));
    }
}
