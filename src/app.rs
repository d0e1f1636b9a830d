use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::routes::{charts, dashboard, health, session, universe};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    let router = Router::<AppState>::new()
        .merge(dashboard::router())
        .nest(dashboard::SESSION_PATH, session::router())
        .nest("/health", health::router())
        .nest("/api/universe", universe::router())
        .nest("/api/chart", charts::router())
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors).with_state(state),
        None => router.with_state(state),
    }
}

fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET]),
    )
}
