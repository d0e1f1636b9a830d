use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Symbol, TickerRecord};

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// The body was valid JSON but carried no time series. Alpha Vantage
    /// answers this way when throttling, so callers may retry it.
    #[error("missing time series: {0}")]
    MissingSeries(String),
}

impl PriceProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PriceProviderError::MissingSeries(_))
    }
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// One request for the full daily adjusted series of `symbol`,
    /// returned in ascending date order.
    async fn fetch_daily_adjusted(
        &self,
        symbol: Symbol,
    ) -> Result<Vec<TickerRecord>, PriceProviderError>;
}
