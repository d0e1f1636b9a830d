mod app;
mod config;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use crate::config::AppConfig;
use crate::external::alphavantage::AlphaVantageProvider;
use crate::logging::LoggingConfig;
use crate::services::fetch_service::TokioSleeper;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;
    tracing::info!(
        "📊 Alpha Vantage at {} ({} attempts per ticker, {}ms delay unit)",
        config.base_url,
        config.retry.max_attempts,
        config.retry.delay_unit.as_millis()
    );

    if config.plotly_sri.is_none() {
        tracing::warn!("PLOTLY_SRI not set, {} is loaded without an integrity check", config.plotly_src);
    }

    // One client for every attempt and every session
    let client = reqwest::Client::builder().build()?;
    let provider = AlphaVantageProvider::new(client, config.base_url.clone(), config.api_key.clone());

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let state = AppState {
        config: Arc::new(config),
        price_provider: Arc::new(provider),
        sleeper: Arc::new(TokioSleeper),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("🚀 Stock dashboard running at http://{}/", local);
    axum::serve(listener, app)
        .await?;

    Ok(())
}
