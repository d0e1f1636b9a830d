use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::models::{Field, SelectionState, Symbol};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_universe))
}

#[derive(Debug, Clone, Serialize)]
pub struct TickerInfo {
    pub symbol: Symbol,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub value: Field,
    pub label: &'static str,
    pub normalizable: bool,
}

/// What the dashboard controls offer, and what they start on.
#[derive(Debug, Clone, Serialize)]
pub struct Universe {
    pub tickers: Vec<TickerInfo>,
    pub fields: Vec<FieldInfo>,
    pub default_selection: SelectionState,
}

pub fn universe() -> Universe {
    Universe {
        tickers: Symbol::ALL
            .iter()
            .map(|symbol| TickerInfo {
                symbol: *symbol,
                color: symbol.color(),
            })
            .collect(),
        fields: Field::ALL
            .iter()
            .map(|field| FieldInfo {
                value: *field,
                label: field.title(),
                normalizable: field.is_normalizable(),
            })
            .collect(),
        default_selection: SelectionState::default(),
    }
}

async fn get_universe() -> Json<Universe> {
    info!("GET /api/universe - Listing tickers and fields");
    Json(universe())
}
