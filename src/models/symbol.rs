use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tickers the dashboard knows how to query and draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbol {
    Aapl,
    Goog,
    Msft,
    Fb,
    Pfe,
    Mrna,
    Jnj,
    Azn,
}

impl Symbol {
    pub const ALL: [Symbol; 8] = [
        Symbol::Aapl,
        Symbol::Goog,
        Symbol::Msft,
        Symbol::Fb,
        Symbol::Pfe,
        Symbol::Mrna,
        Symbol::Jnj,
        Symbol::Azn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Aapl => "AAPL",
            Symbol::Goog => "GOOG",
            Symbol::Msft => "MSFT",
            Symbol::Fb => "FB",
            Symbol::Pfe => "PFE",
            Symbol::Mrna => "MRNA",
            Symbol::Jnj => "JNJ",
            Symbol::Azn => "AZN",
        }
    }

    /// Line colour used for this ticker in every chart.
    pub fn color(&self) -> &'static str {
        match self {
            Symbol::Aapl => "black",
            Symbol::Goog => "red",
            Symbol::Msft => "green",
            Symbol::Fb => "blue",
            Symbol::Pfe => "orange",
            Symbol::Mrna => "purple",
            Symbol::Jnj => "brown",
            Symbol::Azn => "grey",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Symbol::ALL
            .into_iter()
            .find(|sym| sym.as_str() == upper)
            .ok_or_else(|| format!("Unknown ticker: {}", s))
    }
}
