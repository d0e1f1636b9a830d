use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Field;

// One trading day for one ticker. Values the API omitted stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adjusted_close: Option<f64>,
    pub volume: Option<u64>,
    pub dividend_amount: Option<f64>,
    pub split_coefficient: Option<f64>,
}

impl TickerRecord {
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
            Field::AdjustedClose => self.adjusted_close,
            Field::Volume => self.volume.map(|v| v as f64),
            Field::DividendAmount => self.dividend_amount,
            Field::SplitCoefficient => self.split_coefficient,
        }
    }
}
