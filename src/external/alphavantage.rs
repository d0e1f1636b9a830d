use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{Symbol, TickerRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

pub struct AlphaVantageProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvDailyAdjustedResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, AvDailyAdjustedBar>>,

    // When throttled:
    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    // Newer throttle / premium notices use this key instead
    #[serde(rename = "Information")]
    information: Option<String>,

    // When invalid:
    // { "Error Message": "Invalid API call. ..." }
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvDailyAdjustedBar {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: Option<String>,
    #[serde(rename = "5. adjusted close")]
    adjusted_close: Option<String>,
    #[serde(rename = "6. volume")]
    volume: Option<String>,
    #[serde(rename = "7. dividend amount")]
    dividend_amount: Option<String>,
    #[serde(rename = "8. split coefficient")]
    split_coefficient: Option<String>,
}

fn parse_float(raw: Option<&str>) -> Result<Option<f64>, PriceProviderError> {
    raw.map(|s| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| PriceProviderError::Parse(format!("{:?}: {}", s, e)))
    })
    .transpose()
}

fn parse_volume(raw: Option<&str>) -> Result<Option<u64>, PriceProviderError> {
    raw.map(|s| {
        let s = s.trim();
        s.parse::<u64>()
            .or_else(|_| s.parse::<f64>().map(|v| v.round() as u64))
            .map_err(|e| PriceProviderError::Parse(format!("{:?}: {}", s, e)))
    })
    .transpose()
}

/// Turns a `TIME_SERIES_DAILY_ADJUSTED` body into ascending records.
///
/// Only the presence of the time-series key is checked; individual bar
/// fields may be missing.
pub fn parse_daily_adjusted(body: &str) -> Result<Vec<TickerRecord>, PriceProviderError> {
    let body: AvDailyAdjustedResponse =
        serde_json::from_str(body).map_err(|e| PriceProviderError::Parse(e.to_string()))?;

    let series = match body.time_series {
        Some(series) => series,
        None => {
            let reason = body
                .note
                .or(body.information)
                .or(body.error_message)
                .unwrap_or_else(|| "no \"Time Series (Daily)\" key".to_string());
            return Err(PriceProviderError::MissingSeries(reason));
        }
    };

    // keyed by "YYYY-MM-DD"; BTreeMap iterates ascending, the API sends newest first
    let mut out = Vec::with_capacity(series.len());
    for (date_str, bar) in series {
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| PriceProviderError::Parse(format!("{}: {}", date_str, e)))?;

        out.push(TickerRecord {
            date,
            open: parse_float(bar.open.as_deref())?,
            high: parse_float(bar.high.as_deref())?,
            low: parse_float(bar.low.as_deref())?,
            close: parse_float(bar.close.as_deref())?,
            adjusted_close: parse_float(bar.adjusted_close.as_deref())?,
            volume: parse_volume(bar.volume.as_deref())?,
            dividend_amount: parse_float(bar.dividend_amount.as_deref())?,
            split_coefficient: parse_float(bar.split_coefficient.as_deref())?,
        });
    }

    Ok(out)
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    async fn fetch_daily_adjusted(
        &self,
        symbol: Symbol,
    ) -> Result<Vec<TickerRecord>, PriceProviderError> {
        let url = format!("{}/query", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("function", "TIME_SERIES_DAILY_ADJUSTED"),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let body = resp
            .text()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        parse_daily_adjusted(&body)
    }
}
