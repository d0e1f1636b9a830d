use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::config::AppConfig;
use crate::state::AppState;

const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.html");
const PAGE_TITLE: &str = "Stock Query Viz";
pub const SESSION_PATH: &str = "/ws";

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

pub fn render_dashboard_html(config: &AppConfig, ws_path: &str) -> String {
    let integrity = config
        .plotly_sri
        .as_deref()
        .map(|sri| format!(" integrity=\"{}\"", sri))
        .unwrap_or_default();

    DASHBOARD_TEMPLATE
        .replace("{{ title }}", PAGE_TITLE)
        .replace("{{ plotly_src }}", &config.plotly_src)
        .replace("{{ plotly_integrity }}", &integrity)
        .replace("{{ ws_path }}", ws_path)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    info!("GET / - Serving dashboard page");
    Html(render_dashboard_html(&state.config, SESSION_PATH))
}
