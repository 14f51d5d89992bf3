use serde::Serialize;

use crate::error::ErrorCode;
use crate::protocol::{MessageType, ServerMessage};

use super::context::{HandlerContext, HandlerResult};

#[derive(Serialize)]
struct GameStartedPayload<'a> {
    room: &'a crate::room::RoomView,
    state: &'a crate::game::GameState,
}

pub async fn handle(ctx: HandlerContext) -> HandlerResult {
    let (Some(user_id), Some(room_id)) = (ctx.user_id, ctx.manager.room_of(ctx.connection_id)) else {
        return HandlerResult::err(ServerMessage::error("NOT_IN_ROOM", "not seated in a room"));
    };

    match ctx.rooms.start_game(room_id, user_id).await {
        Ok((view, state)) => {
            let payload = GameStartedPayload { room: &view, state: &state };
            let started = ServerMessage::new(MessageType::GameStarted, payload);
            HandlerResult::ok_with_broadcast(Some(started.clone()), started, room_id)
        }
        Err(e) => HandlerResult::err(ServerMessage::error(e.error_code(), e.to_string())),
    }
}
