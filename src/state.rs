use std::sync::Arc;

use crate::config::AppConfig;
use crate::external::price_provider::PriceProvider;
use crate::services::fetch_service::Sleeper;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub price_provider: Arc<dyn PriceProvider>,
    pub sleeper: Arc<dyn Sleeper>,
}

#[cfg(test)]
pub(crate) fn test_state(
    provider: Arc<crate::services::fetch_service::testing::ScriptedProvider>,
    max_attempts: u32,
) -> AppState {
    use crate::services::fetch_service::testing::RecordingSleeper;

    let config = AppConfig::from_lookup(|key| match key {
        "ALPHA_API_KEY" => Some("test".to_string()),
        "FETCH_MAX_ATTEMPTS" => Some(max_attempts.to_string()),
        _ => None,
    })
    .expect("test config");

    AppState {
        config: Arc::new(config),
        price_provider: provider,
        sleeper: Arc::new(RecordingSleeper::default()),
    }
}
