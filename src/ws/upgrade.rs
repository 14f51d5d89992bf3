//! WebSocket endpoint (C9), grounded on the original ruleset's
//! `websocket_endpoint` in `app/routers/ws.py`: accept, read loop, gate,
//! dispatch, teardown. Unlike the original, the bearer token travels in the
//! first `authenticate` frame rather than a query string (SPEC_FULL.md
//! §4.9) so a connection always gets a clean application-level close code
//! instead of a bare TCP reset for a bad/missing token.

use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::connection::Outbound;
use crate::error::ErrorCode;
use crate::handlers::{dispatch, HandlerContext};
use crate::protocol::{check_size, parse_envelope, MessageType, RateLimiter, ServerMessage};
use crate::state::AppState;

const AUTH_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_AUTH_TIMEOUT: u16 = 4005;
/// RFC 6455 "invalid frame payload data" — a binary frame that isn't UTF-8.
const CLOSE_INVALID_FRAME: u16 = 1007;

#[derive(Serialize)]
struct ConnectedPayload {
    connection_id: uuid::Uuid,
}

pub async fn handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (connection_id, mut outbound_rx) = state.manager.register_unauthenticated();

    let forward = tokio::spawn(async move {
        while let Some(outbound) = outbound_rx.recv().await {
            let sent = match outbound {
                Outbound::Message(message) => {
                    let text = serde_json::to_string(&message).expect("ServerMessage always serializes");
                    ws_tx.send(Message::Text(text)).await
                }
                Outbound::Close(code) => {
                    let frame = axum::extract::ws::CloseFrame { code, reason: "".into() };
                    let _ = ws_tx.send(Message::Close(Some(frame))).await;
                    break;
                }
            };
            if sent.is_err() {
                break;
            }
        }
    });

    state.manager.send_to_connection(connection_id, ServerMessage::new(MessageType::Connected, ConnectedPayload { connection_id }));

    let mut rate_limiter = RateLimiter::new();
    let mut authenticated = false;

    loop {
        let next = if authenticated {
            ws_rx.next().await
        } else {
            match timeout(AUTH_TIMEOUT, ws_rx.next()).await {
                Ok(next) => next,
                Err(_) => {
                    debug!(%connection_id, "authentication timed out");
                    state.manager.evict(connection_id, CLOSE_AUTH_TIMEOUT).await;
                    break;
                }
            }
        };

        let Some(frame) = next else {
            break;
        };
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                warn!(%connection_id, error = %e, "socket read error");
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    debug!(%connection_id, "binary frame was not valid utf-8");
                    state.manager.evict(connection_id, CLOSE_INVALID_FRAME).await;
                    break;
                }
            },
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        if let Err(e) = check_size(text.as_bytes()) {
            state.manager.send_to_connection(connection_id, ServerMessage::typed_error(MessageType::Error, "MESSAGE_TOO_LARGE", e.to_string()));
            continue;
        }
        if !rate_limiter.check(Instant::now()) {
            state.manager.send_to_connection(connection_id, ServerMessage::error("RATE_LIMITED", "too many messages"));
            continue;
        }
        let client_message = match parse_envelope(&text) {
            Ok(message) => message,
            Err(e) => {
                state.manager.send_to_connection(connection_id, ServerMessage::error(e.error_code(), e.to_string()));
                continue;
            }
        };

        let ctx = HandlerContext {
            connection_id,
            user_id: state.manager.user_of(connection_id),
            message: client_message,
            manager: state.manager.clone(),
            rooms: state.rooms.clone(),
            verifier: state.verifier.clone(),
        };

        let result = dispatch(ctx).await;
        if let Some(reply) = result.reply {
            state.manager.send_to_connection(connection_id, reply);
        }
        if let (Some(broadcast), Some(room_id)) = (result.broadcast, result.room_id) {
            state.manager.send_to_room(room_id, broadcast, Some(connection_id));
        }
        if !authenticated && state.manager.user_of(connection_id).is_some() {
            authenticated = true;
        }
    }

    state.manager.disconnect(connection_id).await;
    forward.abort();
}
