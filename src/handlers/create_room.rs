use serde::Deserialize;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::protocol::{MessageType, ServerMessage};

use super::context::{HandlerContext, HandlerResult};

#[derive(Deserialize)]
struct CreateRoomPayload {
    #[serde(default = "default_max_players")]
    max_players: u8,
    #[serde(default = "default_ruleset")]
    ruleset_id: String,
    #[serde(default)]
    ruleset_config: serde_json::Value,
}

fn default_max_players() -> u8 {
    4
}

fn default_ruleset() -> String {
    "classic".into()
}

pub async fn handle(ctx: HandlerContext) -> HandlerResult {
    let Some(user_id) = ctx.user_id else {
        return HandlerResult::err(ServerMessage::typed_error(MessageType::CreateRoomError, "NOT_IN_ROOM", "must authenticate first"));
    };

    let payload: CreateRoomPayload = match ctx.message.payload.clone() {
        Some(v) => match serde_json::from_value(v) {
            Ok(p) => p,
            Err(e) => return HandlerResult::err(ServerMessage::typed_error(MessageType::CreateRoomError, "VALIDATION_ERROR", e.to_string())),
        },
        None => CreateRoomPayload { max_players: 4, ruleset_id: "classic".into(), ruleset_config: serde_json::json!({}) },
    };

    let request_id = ctx.message.request_id.unwrap_or_else(Uuid::new_v4);
    let result = ctx
        .rooms
        .create_room(user_id, request_id, None, payload.max_players, &payload.ruleset_id, payload.ruleset_config)
        .await;

    match result {
        Ok(created) => {
            ctx.manager.join_connection_to_room(ctx.connection_id, created.view.room_id);
            let reply = ServerMessage::new(MessageType::CreateRoomOk, &created.view).with_request_id(ctx.message.request_id);
            HandlerResult::ok(Some(reply))
        }
        Err(e) => HandlerResult::err(ServerMessage::typed_error(MessageType::CreateRoomError, e.error_code(), e.to_string()).with_request_id(ctx.message.request_id)),
    }
}
