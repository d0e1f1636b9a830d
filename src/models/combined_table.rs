use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::models::{Field, Symbol, TickerRecord};

/// Every fetched ticker and field laid out on one shared date axis.
///
/// The axis is the union of all tickers' trading days in ascending order.
/// A ticker with no sample on a given day (or a sample missing that field)
/// holds `NaN` there, which the chart renders as a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<(Symbol, Field), Vec<f64>>,
}

impl CombinedTable {
    pub fn from_records(records: &BTreeMap<Symbol, Vec<TickerRecord>>) -> Self {
        let dates: Vec<NaiveDate> = records
            .values()
            .flat_map(|rows| rows.iter().map(|r| r.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut columns = BTreeMap::new();
        for (symbol, rows) in records {
            let by_date: HashMap<NaiveDate, &TickerRecord> =
                rows.iter().map(|r| (r.date, r)).collect();

            for field in Field::ALL {
                let values = dates
                    .iter()
                    .map(|d| {
                        by_date
                            .get(d)
                            .and_then(|r| r.value(field))
                            .unwrap_or(f64::NAN)
                    })
                    .collect();
                columns.insert((*symbol, field), values);
            }
        }

        Self { dates, columns }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn series(&self, symbol: Symbol, field: Field) -> Option<&[f64]> {
        self.columns.get(&(symbol, field)).map(Vec::as_slice)
    }

    pub fn tickers(&self) -> Vec<Symbol> {
        self.columns
            .keys()
            .map(|(symbol, _)| *symbol)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, close: f64) -> TickerRecord {
        TickerRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: Some(close - 1.0),
            high: Some(close + 1.0),
            low: Some(close - 2.0),
            close: Some(close),
            adjusted_close: Some(close),
            volume: Some(1_000),
            dividend_amount: Some(0.0),
            split_coefficient: Some(1.0),
        }
    }

    #[test]
    fn test_axis_is_union_of_dates_in_ascending_order() {
        let mut records = BTreeMap::new();
        records.insert(
            Symbol::Aapl,
            vec![record("2021-03-01", 10.0), record("2021-03-03", 12.0)],
        );
        records.insert(
            Symbol::Goog,
            vec![record("2021-03-02", 20.0), record("2021-03-03", 21.0)],
        );

        let table = CombinedTable::from_records(&records);

        assert_eq!(table.len(), 3);
        assert!(table.dates().windows(2).all(|w| w[0] < w[1]));

        let aapl = table.series(Symbol::Aapl, Field::Close).unwrap();
        assert_eq!(aapl[0], 10.0);
        assert!(aapl[1].is_nan());
        assert_eq!(aapl[2], 12.0);

        let goog = table.series(Symbol::Goog, Field::Close).unwrap();
        assert!(goog[0].is_nan());
        assert_eq!(goog[1], 20.0);
    }

    #[test]
    fn test_missing_field_becomes_gap() {
        let mut row = record("2021-03-01", 10.0);
        row.volume = None;
        let mut records = BTreeMap::new();
        records.insert(Symbol::Pfe, vec![row]);

        let table = CombinedTable::from_records(&records);

        assert!(table.series(Symbol::Pfe, Field::Volume).unwrap()[0].is_nan());
        assert_eq!(table.series(Symbol::Pfe, Field::Open).unwrap()[0], 9.0);
    }

    #[test]
    fn test_unfetched_ticker_has_no_series() {
        let mut records = BTreeMap::new();
        records.insert(Symbol::Jnj, vec![record("2021-03-01", 10.0)]);

        let table = CombinedTable::from_records(&records);

        assert_eq!(table.tickers(), vec![Symbol::Jnj]);
        assert!(table.series(Symbol::Azn, Field::Close).is_none());
    }
}
