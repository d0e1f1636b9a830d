use tracing::warn;

use crate::models::{ChartSpec, CombinedTable, Legend, LineSeries, SelectionState};

const CHART_TITLE: &str = "Recent stocks performance queried using Alpha Vantage API";
const CHART_WIDTH: u32 = 700;
const CHART_HEIGHT: u32 = 400;
const LINE_WIDTH: u32 = 2;

/// Percentage change of every sample relative to the first one.
///
/// Leading gaps are skipped when picking the base. A zero or missing base
/// has no meaningful percentage change, so the whole series becomes gaps.
pub fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let base = values.iter().copied().find(|v| v.is_finite())?;
    if base == 0.0 {
        return None;
    }
    Some(values.iter().map(|v| 100.0 * (v - base) / base).collect())
}

/// Builds the chart for the current selection. Never touches `table`.
pub fn build(table: &CombinedTable, selection: &SelectionState) -> ChartSpec {
    let normalized = selection.effective_normalize();

    let y_axis_label = if normalized {
        format!("{} - Percentage Change", selection.field.title())
    } else {
        selection.field.title().to_string()
    };

    let mut series = Vec::with_capacity(selection.tickers.len());
    for ticker in &selection.tickers {
        let Some(values) = table.series(*ticker, selection.field) else {
            warn!("No {} data for {}, leaving it off the chart", selection.field, ticker);
            continue;
        };

        let y = if normalized {
            normalize(values).unwrap_or_else(|| {
                warn!("Cannot normalize {} {}: first value is zero or missing", ticker, selection.field);
                vec![f64::NAN; values.len()]
            })
        } else {
            values.to_vec()
        };

        series.push(LineSeries {
            ticker: *ticker,
            label: ticker.to_string(),
            color: ticker.color().to_string(),
            line_width: LINE_WIDTH,
            x: table.dates().to_vec(),
            y,
        });
    }

    ChartSpec {
        title: CHART_TITLE.to_string(),
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        x_axis_type: "datetime".to_string(),
        y_axis_label,
        normalized,
        series,
        legend: Legend {
            location: "top_left".to_string(),
            title: "Stock".to_string(),
            title_font_style: "bold".to_string(),
            title_font_size: "12px".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Symbol, TickerRecord};
    use crate::services::fetch_service::testing::daily_records;
    use std::collections::BTreeMap;

    fn table() -> CombinedTable {
        let mut records: BTreeMap<Symbol, Vec<TickerRecord>> = BTreeMap::new();
        records.insert(Symbol::Aapl, daily_records("2021-03-01", &[100.0, 110.0, 90.0]));
        records.insert(Symbol::Goog, daily_records("2021-03-01", &[2000.0, 2100.0, 2050.0]));
        records.insert(Symbol::Pfe, daily_records("2021-03-01", &[35.0, 36.0, 34.0]));
        CombinedTable::from_records(&records)
    }

    fn selection(tickers: Vec<Symbol>, field: Field, normalize: bool) -> SelectionState {
        SelectionState { field, tickers, normalize }
    }

    #[test]
    fn test_two_normalized_close_series_start_at_zero() {
        let table = table();
        let chart = build(&table, &selection(vec![Symbol::Aapl, Symbol::Goog], Field::Close, true));

        assert_eq!(chart.series.len(), 2);
        for line in &chart.series {
            assert_eq!(line.y[0], 0.0);
        }
        assert_eq!(chart.series[0].y, vec![0.0, 10.0, -10.0]);
        assert_eq!(chart.series[0].color, "black");
        assert_eq!(chart.series[1].color, "red");
        assert_eq!(chart.y_axis_label, "4. Close - Percentage Change");
        assert!(chart.normalized);
    }

    #[test]
    fn test_every_normalizable_field_starts_at_zero() {
        let table = table();
        for field in Field::ALL.into_iter().filter(|f| f.is_normalizable()) {
            let chart = build(&table, &selection(vec![Symbol::Pfe], field, true));
            assert_eq!(chart.series[0].y[0], 0.0, "{field} should start at zero");
        }
    }

    #[test]
    fn test_excluded_fields_are_drawn_raw() {
        let table = table();
        let chart = build(&table, &selection(vec![Symbol::Aapl], Field::SplitCoefficient, true));

        assert!(!chart.normalized);
        assert_eq!(chart.y_axis_label, "8. Split Coefficient");
        assert_eq!(chart.series[0].y, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_raw_values_when_toggle_is_off() {
        let table = table();
        let chart = build(&table, &selection(vec![Symbol::Goog], Field::Close, false));

        assert_eq!(chart.y_axis_label, "4. Close");
        assert_eq!(chart.series[0].y, vec![2000.0, 2100.0, 2050.0]);
        assert_eq!(chart.series[0].x, table.dates().to_vec());
    }

    #[test]
    fn test_zero_base_yields_gaps() {
        let mut records: BTreeMap<Symbol, Vec<TickerRecord>> = BTreeMap::new();
        records.insert(Symbol::Mrna, daily_records("2021-03-01", &[0.0, 5.0, 6.0]));
        let table = CombinedTable::from_records(&records);

        let chart = build(&table, &selection(vec![Symbol::Mrna], Field::Close, true));

        assert_eq!(chart.series.len(), 1);
        assert!(chart.series[0].y.iter().all(|v| v.is_nan()));
        assert!(normalize(&[0.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_normalize_skips_leading_gaps() {
        let out = normalize(&[f64::NAN, 50.0, 75.0]).unwrap();
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[0.0, 50.0]);
        assert!(normalize(&[f64::NAN, f64::NAN]).is_none());
    }

    #[test]
    fn test_series_follow_selection_order_and_skip_unfetched() {
        let table = table();
        let chart = build(
            &table,
            &selection(vec![Symbol::Pfe, Symbol::Azn, Symbol::Aapl], Field::Open, false),
        );

        let labels: Vec<&str> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["PFE", "AAPL"]);
    }

    #[test]
    fn test_build_leaves_table_untouched() {
        let table = table();
        let before = table.clone();
        let mut state = selection(vec![Symbol::Aapl], Field::Close, true);

        build(&table, &state);
        state.field = Field::Volume;
        state.set_tickers(vec![Symbol::Goog, Symbol::Pfe]);
        build(&table, &state);

        // NaN-free fixture, so PartialEq is meaningful here
        assert_eq!(table, before);
    }

    #[test]
    fn test_legend_and_layout_are_fixed() {
        let chart = build(&table(), &SelectionState::default());
        assert_eq!(chart.width, 700);
        assert_eq!(chart.height, 400);
        assert_eq!(chart.legend.location, "top_left");
        assert_eq!(chart.legend.title, "Stock");
        assert!(chart.series.iter().all(|s| s.line_width == 2));
    }
}
