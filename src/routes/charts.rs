use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{ChartSpec, Field, SelectionState, Symbol};
use crate::services::{chart_service, fetch_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_chart))
}

/// `?tickers=AAPL,GOOG&field=4.%20close&normalize=true`; omitted parameters
/// fall back to the dashboard defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    tickers: Option<String>,
    field: Option<String>,
    normalize: Option<bool>,
}

impl ChartQuery {
    fn into_selection(self) -> Result<SelectionState, AppError> {
        let mut selection = SelectionState::default();

        if let Some(raw) = self.tickers {
            let tickers = raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::parse::<Symbol>)
                .collect::<Result<Vec<_>, _>>()?;
            selection.set_tickers(tickers);
        }
        if let Some(raw) = self.field {
            selection.field = raw.parse::<Field>()?;
        }
        if let Some(normalize) = self.normalize {
            selection.normalize = normalize;
        }

        Ok(selection)
    }
}

/// One-shot chart: fetches only the requested tickers, then builds the chart.
async fn get_chart(
    Query(query): Query<ChartQuery>,
    State(state): State<AppState>,
) -> Result<Json<ChartSpec>, AppError> {
    let selection = query.into_selection()?;
    info!("GET /api/chart - {:?} {} normalize={}", selection.tickers, selection.field, selection.normalize);

    let table = fetch_service::fetch_all(
        state.price_provider.as_ref(),
        state.sleeper.as_ref(),
        &state.config.retry,
        &selection.tickers,
    )
    .await
    .map_err(|e| {
        error!("Failed to fetch chart data: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(chart_service::build(&table, &selection)))
}
