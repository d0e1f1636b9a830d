use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Symbol;

/// Everything the browser needs to draw one line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_axis_type: String,
    pub y_axis_label: String,
    pub normalized: bool,
    pub series: Vec<LineSeries>,
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub ticker: Symbol,
    pub label: String,
    pub color: String,
    pub line_width: u32,
    pub x: Vec<NaiveDate>,
    // NaN serializes as null, which the renderer draws as a gap.
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub location: String,
    pub title: String,
    pub title_font_style: String,
    pub title_font_size: String,
}
