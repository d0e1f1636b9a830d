use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{CombinedTable, Symbol, TickerRecord};

/// Bounded, linearly growing retry budget for one ticker.
///
/// There is no wait before the first attempt. Before every retry the fetcher
/// sleeps `delay_unit * n`, where `n` starts at 1 and grows by one once per
/// `attempts_per_step` failures: after the 2nd, 5th, 8th... for a step of 3.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_unit: Duration,
    pub attempts_per_step: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            delay_unit: Duration::from_secs(1),
            attempts_per_step: 3,
        }
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data for {ticker} after {attempts} attempts")]
    DataUnavailable { ticker: Symbol, attempts: u32 },

    #[error("fetching {ticker} failed: {source}")]
    Provider {
        ticker: Symbol,
        #[source]
        source: PriceProviderError,
    },
}

/// Fetches one ticker, retrying only while the API answers without a time series.
pub async fn fetch_with_retry(
    provider: &dyn PriceProvider,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    ticker: Symbol,
) -> Result<Vec<TickerRecord>, FetchError> {
    let step = policy.attempts_per_step.max(1);
    let mut delay_units: u32 = 1;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match provider.fetch_daily_adjusted(ticker).await {
            Ok(records) => {
                info!("✓ Fetched {} daily records for {} (attempt {})", records.len(), ticker, attempt);
                return Ok(records);
            }
            Err(e) if e.is_transient() => {
                if attempt >= policy.max_attempts {
                    error!("✗ Giving up on {} after {} attempts: {}", ticker, attempt, e);
                    return Err(FetchError::DataUnavailable {
                        ticker,
                        attempts: attempt,
                    });
                }

                warn!("No time series for {} (attempt {}/{}): {}", ticker, attempt, policy.max_attempts, e);

                if attempt % step == 2 % step {
                    info!("Querying from Alpha Vantage API {}", "...".repeat(delay_units as usize));
                    delay_units += 1;
                }

                sleeper.sleep(policy.delay_unit * delay_units).await;
            }
            Err(e) => {
                error!("✗ Failed to fetch {}: {}", ticker, e);
                return Err(FetchError::Provider { ticker, source: e });
            }
        }
    }
}

/// Fetches every ticker in turn and lays them out on one date axis.
pub async fn fetch_all(
    provider: &dyn PriceProvider,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    tickers: &[Symbol],
) -> Result<CombinedTable, FetchError> {
    info!("Starting Alpha Vantage API for {} tickers", tickers.len());

    let mut records: BTreeMap<Symbol, Vec<TickerRecord>> = BTreeMap::new();
    for ticker in tickers {
        if records.contains_key(ticker) {
            continue;
        }
        let rows = fetch_with_retry(provider, sleeper, policy, *ticker).await?;
        records.insert(*ticker, rows);
    }

    let table = CombinedTable::from_records(&records);
    info!("✓ Combined table ready: {} tickers over {} dates", records.len(), table.len());
    Ok(table)
}
