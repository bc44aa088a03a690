//! HTTP/WebSocket server
//!
//! Serves the frontend static files, the symbol REST endpoints and the /ws
//! stream that clients subscribe to for market updates. The server is a thin
//! collaborator around the core: it mutates the symbol selection and hands
//! sockets to the broadcast hub.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::broadcast::{BroadcastHub, Subscriber, WsSubscriber};
use crate::core::selection::SharedSelection;
use crate::core::SymbolSelection;
use crate::exchanges::{Exchange, ExchangeGateway};
use crate::infrastructure::config::ApiConfig;
use crate::MonitorError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ExchangeGateway>,
    pub selection: SharedSelection,
    pub hub: Arc<BroadcastHub>,
}

#[derive(Debug, Serialize)]
struct SymbolsDto {
    symbols: Vec<String>,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct StatusDto {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl StatusDto {
    fn ok(symbol: impl Into<String>) -> Self {
        Self {
            status: "success",
            symbol: Some(symbol.into()),
            message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            symbol: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SymbolRequest {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct CustomSymbolsRequest {
    mexc_symbol: String,
    lbank_symbol: String,
}

#[derive(Debug, Serialize)]
struct HealthDto {
    status: &'static str,
    service: &'static str,
}

/// Start the API server
pub async fn start_server(state: AppState, config: &ApiConfig) -> Result<(), MonitorError> {
    let static_files = ServeDir::new(&config.static_path);

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/symbols", get(list_symbols))
        .route("/api/symbol", post(set_symbol))
        .route("/api/symbols/custom", post(set_custom_symbols))
        .route("/ws", get(ws_handler))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "healthy",
        service: "spread-monitor",
    })
}

/// Handler for GET /api/symbols: pairs tradable on both exchanges, sorted.
async fn list_symbols(State(state): State<AppState>) -> Json<SymbolsDto> {
    let symbols = state.gateway.common_symbols().await;
    let status = if symbols.is_empty() { "error" } else { "success" };
    Json(SymbolsDto { symbols, status })
}

/// Handler for POST /api/symbol: switch the monitored pair.
///
/// Validates membership in the common universe; the swap takes effect on the
/// engine's next cycle.
async fn set_symbol(
    State(state): State<AppState>,
    Json(request): Json<SymbolRequest>,
) -> (StatusCode, Json<StatusDto>) {
    let common = state.gateway.common_symbols().await;
    if !common.contains(&request.symbol) {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusDto::error(format!(
                "symbol {} is not tradable on both exchanges",
                request.symbol
            ))),
        );
    }

    tracing::info!("Switching monitored pair to {}", request.symbol);
    state
        .selection
        .store(Arc::new(SymbolSelection::new(request.symbol.clone())));
    (StatusCode::OK, Json(StatusDto::ok(request.symbol)))
}

/// Handler for POST /api/symbols/custom: independent pair per exchange.
async fn set_custom_symbols(
    State(state): State<AppState>,
    Json(request): Json<CustomSymbolsRequest>,
) -> (StatusCode, Json<StatusDto>) {
    // Make sure the universe is loaded before membership checks
    let _ = state.gateway.common_symbols().await;

    if !state.gateway.knows_symbol(Exchange::Mexc, &request.mexc_symbol) {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusDto::error(format!(
                "symbol {} is not tradable on MEXC",
                request.mexc_symbol
            ))),
        );
    }
    if !state.gateway.knows_symbol(Exchange::LBank, &request.lbank_symbol) {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusDto::error(format!(
                "symbol {} is not tradable on LBank",
                request.lbank_symbol
            ))),
        );
    }

    tracing::info!(
        "Switching to custom mode: MEXC {}, LBank {}",
        request.mexc_symbol,
        request.lbank_symbol
    );
    state.selection.store(Arc::new(SymbolSelection::custom(
        request.mexc_symbol.clone(),
        request.lbank_symbol.clone(),
    )));
    (
        StatusCode::OK,
        Json(StatusDto::ok(format!(
            "{}|{}",
            request.mexc_symbol, request.lbank_symbol
        ))),
    )
}

/// Handler for GET /ws: upgrade and register with the broadcast hub.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection task: drain the hub channel into the socket, read and
/// discard inbound frames (they only signal liveness).
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (subscriber, mut rx) = WsSubscriber::channel();
    let id = subscriber.id();
    state.hub.connect(subscriber);

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(payload) => {
                        if sender.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Hub dropped us (pruned after a failed delivery)
                    None => break,
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.hub.disconnect(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_dto_shapes() {
        let ok = serde_json::to_value(StatusDto::ok("BTC/USDT")).unwrap();
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["symbol"], "BTC/USDT");
        assert!(ok.get("message").is_none());

        let err = serde_json::to_value(StatusDto::error("nope")).unwrap();
        assert_eq!(err["status"], "error");
        assert_eq!(err["message"], "nope");
    }

    #[test]
    fn test_symbol_request_deserialize() {
        let request: SymbolRequest = serde_json::from_str(r#"{"symbol":"ETH/USDT"}"#).unwrap();
        assert_eq!(request.symbol, "ETH/USDT");

        let custom: CustomSymbolsRequest =
            serde_json::from_str(r#"{"mexc_symbol":"BTC/USDT","lbank_symbol":"ETH/USDT"}"#)
                .unwrap();
        assert_eq!(custom.mexc_symbol, "BTC/USDT");
        assert_eq!(custom.lbank_symbol, "ETH/USDT");
    }
}
