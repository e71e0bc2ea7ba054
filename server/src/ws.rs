use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tower_http::cors::CorsLayer;

use crate::game_loop::{GameBroadcast, GameCommand};
use crate::protocol::{ClientMsg, ServerMsg, StateMsg};

/// Control messages are tiny; anything bigger is abuse.
pub const MAX_MESSAGE_SIZE: usize = 1024;
/// Unparseable messages tolerated before the connection is dropped.
pub const MAX_PARSE_ERRORS: u32 = 5;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
    pub connection_semaphore: Arc<Semaphore>,
}

/// Borrowed form of `ServerMsg::State`, so a shared snapshot is encoded
/// without copying it.
#[derive(Serialize)]
#[serde(tag = "type", rename = "state")]
struct StateRef<'a> {
    #[serde(flatten)]
    state: &'a StateMsg,
}

fn encode_state(state: &StateMsg) -> serde_json::Result<String> {
    serde_json::to_string(&StateRef { state })
}

/// `/ws` for players, `/health` for probes.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn health() -> &'static str {
    "ok"
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let permit = match app_state.connection_semaphore.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!("Connection rejected: server full");
            return (StatusCode::SERVICE_UNAVAILABLE, "server full").into_response();
        }
    };
    ws.max_message_size(MAX_MESSAGE_SIZE * 4)
        .on_upgrade(move |socket| handle_socket(socket, app_state, permit))
}

async fn handle_socket(socket: WebSocket, app_state: AppState, _permit: OwnedSemaphorePermit) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before joining so our own join shows up in the player count
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::PlayerJoin { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send PlayerJoin command");
        return;
    }

    let (my_id, welcome) = match resp_rx.await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Failed to receive welcome");
            return;
        }
    };

    tracing::info!("Player {} connected", my_id);

    match serde_json::to_string(&ServerMsg::Welcome(welcome)) {
        Ok(json) => {
            if sink.send(Message::Text(json.into())).await.is_err() {
                leave(&app_state, my_id).await;
                return;
            }
        }
        Err(e) => {
            tracing::error!("Failed to encode welcome: {}", e);
            leave(&app_state, my_id).await;
            return;
        }
    }

    let mut parse_errors = 0u32;

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_MESSAGE_SIZE {
                            tracing::warn!("Player {} sent oversized message ({} bytes)", my_id, text.len());
                            break;
                        }
                        let cmd = match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(ClientMsg::Change { force, angle }) => GameCommand::Change { id: my_id, force, angle },
                            Ok(ClientMsg::Release) => GameCommand::Release { id: my_id },
                            Err(_) => {
                                parse_errors += 1;
                                if parse_errors >= MAX_PARSE_ERRORS {
                                    tracing::warn!("Player {} exceeded parse error limit", my_id);
                                    break;
                                }
                                continue;
                            }
                        };
                        if app_state.game_tx.send(cmd).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!("Player {} sent binary frame", my_id);
                        break;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {} // Ignore ping/pong
                }
            }

            // Server -> Client (broadcast)
            result = broadcast_rx.recv() => {
                match result {
                    Ok(broadcast) => {
                        let json = match broadcast {
                            GameBroadcast::PlayerCount(msg) => {
                                serde_json::to_string(&ServerMsg::Players(msg))
                            }
                            GameBroadcast::State(msg) => encode_state(&msg),
                        };

                        if let Ok(json) = json {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Player {} lagged by {} messages", my_id, n);
                        // Snapshots are full state, the next one catches the client up
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Cleanup on disconnect
    leave(&app_state, my_id).await;
    let _ = sink.close().await;
    tracing::info!("Player {} disconnected", my_id);
}

async fn leave(app_state: &AppState, id: u32) {
    let _ = app_state.game_tx.send(GameCommand::PlayerLeave { id }).await;
}
