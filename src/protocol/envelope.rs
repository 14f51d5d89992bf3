//! Wire envelope (C6), grounded on the original ruleset's `WSClientMessage`/
//! `WSServerMessage` but widened to the closed `MessageType` set SPEC_FULL.md
//! §4.6 adds for the game session (start_game/game_action/game_events/...).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Authenticate,
    Authenticated,
    Ping,
    Pong,
    Connected,
    Error,
    CreateRoom,
    CreateRoomOk,
    CreateRoomError,
    JoinRoom,
    JoinRoomOk,
    JoinRoomError,
    ToggleReady,
    LeaveRoom,
    RoomUpdated,
    RoomClosed,
    GameAction,
    GameEvents,
    GameState,
    GameError,
    StartGame,
    GameStarted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub request_id: Option<Uuid>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ServerMessage {
    pub fn new(message_type: MessageType, payload: impl Serialize) -> Self {
        Self {
            message_type,
            request_id: None,
            payload: Some(serde_json::to_value(payload).expect("payload must serialize")),
        }
    }

    pub fn with_request_id(mut self, request_id: Option<Uuid>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, ErrorPayload { error_code: code.to_string(), message: message.into() })
    }

    pub fn typed_error(message_type: MessageType, code: &str, message: impl Into<String>) -> Self {
        Self::new(message_type, ErrorPayload { error_code: code.to_string(), message: message.into() })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error_code: String,
    pub message: String,
}
