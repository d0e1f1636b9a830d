use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One column of the daily adjusted time series, named the way the API names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "1. open")]
    Open,
    #[serde(rename = "2. high")]
    High,
    #[serde(rename = "3. low")]
    Low,
    #[serde(rename = "4. close")]
    Close,
    #[serde(rename = "5. adjusted close")]
    AdjustedClose,
    #[serde(rename = "6. volume")]
    Volume,
    #[serde(rename = "7. dividend amount")]
    DividendAmount,
    #[serde(rename = "8. split coefficient")]
    SplitCoefficient,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::AdjustedClose,
        Field::Volume,
        Field::DividendAmount,
        Field::SplitCoefficient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Open => "1. open",
            Field::High => "2. high",
            Field::Low => "3. low",
            Field::Close => "4. close",
            Field::AdjustedClose => "5. adjusted close",
            Field::Volume => "6. volume",
            Field::DividendAmount => "7. dividend amount",
            Field::SplitCoefficient => "8. split coefficient",
        }
    }

    /// Title-cased label for the y axis.
    pub fn title(&self) -> &'static str {
        match self {
            Field::Open => "1. Open",
            Field::High => "2. High",
            Field::Low => "3. Low",
            Field::Close => "4. Close",
            Field::AdjustedClose => "5. Adjusted Close",
            Field::Volume => "6. Volume",
            Field::DividendAmount => "7. Dividend Amount",
            Field::SplitCoefficient => "8. Split Coefficient",
        }
    }

    /// Dividends and split coefficients are mostly zero or one; a percentage
    /// change against the first sample is meaningless for them.
    pub fn is_normalizable(&self) -> bool {
        !matches!(self, Field::DividendAmount | Field::SplitCoefficient)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == needle)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}
