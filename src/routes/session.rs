use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{ChartSpec, SelectionState, Symbol};
use crate::routes::universe::{universe, Universe};
use crate::services::fetch_service;
use crate::services::session_service::{spawn_document, UiEvent};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(ws_handler))
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    Loading { message: String },
    Ready { session_id: Uuid, universe: Universe },
    Chart { chart: &'a ChartSpec },
    Error { message: String },
}

fn check_origin(config: &AppConfig, headers: &HeaderMap) -> Result<(), AppError> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    if config.origin_allowed(origin, host) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "origin {} may not open a session",
            origin.unwrap_or("<none>")
        )))
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    check_origin(&state.config, &headers).map_err(|e| {
        warn!("GET /ws - Rejected: {}", e);
        e
    })?;
    info!("GET /ws - Opening dashboard session");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    run_session(&state, &mut sender, &mut receiver).await;
    let _ = sender.close().await;
}

async fn send_message<Tx>(outbound: &mut Tx, message: &ServerMessage<'_>) -> bool
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: std::fmt::Display,
{
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to encode session message: {}", e);
            return false;
        }
    };
    match outbound.send(Message::Text(text)).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Session socket closed while sending: {}", e);
            false
        }
    }
}

/// Fetches the session's table, then relays control events to the document
/// and every redrawn chart back to the browser until either side goes away.
pub async fn run_session<Tx, Rx>(state: &AppState, outbound: &mut Tx, inbound: &mut Rx)
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: std::fmt::Display,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let loading = ServerMessage::Loading {
        message: "Querying from Alpha Vantage API".to_string(),
    };
    if !send_message(outbound, &loading).await {
        return;
    }

    let fetch = fetch_service::fetch_all(
        state.price_provider.as_ref(),
        state.sleeper.as_ref(),
        &state.config.retry,
        &Symbol::ALL,
    );
    tokio::pin!(fetch);

    // A client that leaves during the load stops the remaining API calls.
    let fetched = loop {
        tokio::select! {
            biased;
            msg = inbound.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    info!("Client left before the session was ready, abandoning fetch");
                    return;
                }
                Some(Ok(_)) => debug!("Ignoring client frame received before the session was ready"),
            },
            result = &mut fetch => break result,
        }
    };

    let table = match fetched {
        Ok(table) => Arc::new(table),
        Err(e) => {
            error!("✗ Session initialization failed: {}", e);
            send_message(outbound, &ServerMessage::Error { message: e.to_string() }).await;
            return;
        }
    };

    let mut document = spawn_document(table, SelectionState::default());
    info!("🚀 Session {} ready", document.id);

    let ready = ServerMessage::Ready {
        session_id: document.id,
        universe: universe(),
    };
    if !send_message(outbound, &ready).await {
        return;
    }

    let initial = document.chart.borrow_and_update().clone();
    if !send_message(outbound, &ServerMessage::Chart { chart: initial.as_ref() }).await {
        return;
    }

    loop {
        tokio::select! {
            changed = document.chart.changed() => {
                if changed.is_err() {
                    break;
                }
                let chart = document.chart.borrow_and_update().clone();
                if !send_message(outbound, &ServerMessage::Chart { chart: chart.as_ref() }).await {
                    break;
                }
            }
            msg = inbound.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<UiEvent>(&text) {
                        Ok(event) => {
                            if document.events.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Session {} ignored malformed event: {}", document.id, e);
                            let message = ServerMessage::Error { message: format!("invalid event: {}", e) };
                            if !send_message(outbound, &message).await {
                                break;
                            }
                        }
                    },
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!("Session {} closed", document.id);
}
