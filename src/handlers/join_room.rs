use serde::Deserialize;

use crate::error::ErrorCode;
use crate::protocol::{MessageType, ServerMessage};

use super::context::{HandlerContext, HandlerResult};

#[derive(Deserialize)]
struct JoinRoomPayload {
    room_code: String,
}

pub async fn handle(ctx: HandlerContext) -> HandlerResult {
    let Some(user_id) = ctx.user_id else {
        return HandlerResult::err(ServerMessage::typed_error(MessageType::JoinRoomError, "NOT_IN_ROOM", "must authenticate first"));
    };

    let payload: JoinRoomPayload = match ctx.message.payload.clone() {
        Some(v) => match serde_json::from_value(v) {
            Ok(p) => p,
            Err(e) => return HandlerResult::err(ServerMessage::typed_error(MessageType::JoinRoomError, "VALIDATION_ERROR", e.to_string())),
        },
        None => return HandlerResult::err(ServerMessage::typed_error(MessageType::JoinRoomError, "VALIDATION_ERROR", "join_room requires a payload")),
    };

    match ctx.rooms.join_room(user_id, &payload.room_code, None).await {
        Ok(view) => {
            ctx.manager.join_connection_to_room(ctx.connection_id, view.room_id);
            let reply = ServerMessage::new(MessageType::JoinRoomOk, &view).with_request_id(ctx.message.request_id);
            HandlerResult::ok_with_broadcast(Some(reply), ServerMessage::new(MessageType::RoomUpdated, view.clone()), view.room_id)
        }
        Err(e) => HandlerResult::err(
            ServerMessage::typed_error(MessageType::JoinRoomError, e.error_code(), e.to_string()).with_request_id(ctx.message.request_id),
        ),
    }
}
