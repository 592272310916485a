//! NGX website scraper
//!
//! Fetches the 30-minute delayed ticker from the Nigerian Exchange website.
//! Several pages carry the ticker; they are tried in order and the first one
//! that yields quotes wins.

use super::parser::extract_from_html;
use super::{select_symbols, Observation, PriceCollector};
use crate::error::CollectionError;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

/// Pages known to carry the delayed ticker
pub const NGX_URLS: [&str; 3] = [
    "https://ngxgroup.com/exchange/data/",
    "https://ngxgroup.com/exchange/data/equities-price-list/",
    "https://ngxgroup.com/exchange/data/data-library/",
];

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Configuration for the NGX scraper
#[derive(Debug, Clone)]
pub struct NgxConfig {
    /// Pages to try, in order
    pub urls: Vec<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Pause after a page that failed or had no quotes
    pub retry_pause: Duration,
    /// Quotes above this are dropped (bond notation like N100,000.00)
    pub max_price: Decimal,
}

impl Default for NgxConfig {
    fn default() -> Self {
        Self {
            urls: NGX_URLS.iter().map(|u| u.to_string()).collect(),
            request_timeout: Duration::from_secs(30),
            retry_pause: Duration::from_secs(1),
            max_price: dec!(50000),
        }
    }
}

/// Scrapes delayed equity prices from ngxgroup.com
pub struct NgxScraper {
    config: NgxConfig,
    client: Client,
}

impl NgxScraper {
    /// Create a scraper with default configuration
    pub fn new() -> Result<Self, CollectionError> {
        Self::with_config(NgxConfig::default())
    }

    /// Create a scraper with custom configuration
    pub fn with_config(config: NgxConfig) -> Result<Self, CollectionError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CollectionError::Unreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &NgxConfig {
        &self.config
    }

    /// Fetch one page and parse its ticker
    async fn fetch_page(&self, url: &str) -> Result<Vec<Observation>, CollectionError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| CollectionError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollectionError::Unreachable(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CollectionError::Unreachable(e.to_string()))?;

        Ok(extract_from_html(&html, self.config.max_price)
            .into_iter()
            .map(|q| Observation::new(q.symbol, q.price, "ngx").with_change(q.change))
            .collect())
    }

    /// Try every configured page until one yields quotes
    pub async fn fetch_all(&self) -> Result<Vec<Observation>, CollectionError> {
        let mut last_error = None;

        for url in &self.config.urls {
            tracing::debug!(url = %url, "Trying NGX page");

            match self.fetch_page(url).await {
                Ok(observations) if !observations.is_empty() => {
                    tracing::info!(url = %url, count = observations.len(), "Fetched NGX quotes");
                    return Ok(observations);
                }
                Ok(_) => {
                    tracing::warn!(url = %url, "Page loaded but no stock data found");
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "NGX page fetch failed");
                    last_error = Some(e);
                }
            }

            tokio::time::sleep(self.config.retry_pause).await;
        }

        Err(last_error.unwrap_or(CollectionError::NoData))
    }
}

#[async_trait]
impl PriceCollector for NgxScraper {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<Observation>, CollectionError> {
        let observations = self.fetch_all().await?;
        Ok(select_symbols(observations, symbols))
    }

    fn name(&self) -> &str {
        "ngx"
    }
}
