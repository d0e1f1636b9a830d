use serde::{Deserialize, Serialize};

use crate::models::{Field, Symbol};

/// What the dashboard controls currently show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub field: Field,
    pub tickers: Vec<Symbol>,
    pub normalize: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            field: Field::Open,
            tickers: vec![Symbol::Aapl, Symbol::Goog, Symbol::Pfe, Symbol::Jnj],
            normalize: true,
        }
    }
}

impl SelectionState {
    /// Replaces the ticker list, keeping widget order and dropping repeats.
    pub fn set_tickers(&mut self, tickers: Vec<Symbol>) {
        let mut deduped = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            if !deduped.contains(&ticker) {
                deduped.push(ticker);
            }
        }
        self.tickers = deduped;
    }

    /// Normalization only applies when the toggle is on and the field supports it.
    pub fn effective_normalize(&self) -> bool {
        self.normalize && self.field.is_normalizable()
    }
}
