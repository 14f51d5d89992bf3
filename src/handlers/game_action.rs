use serde::Serialize;

use crate::game::{self, GameAction};
use crate::protocol::{MessageType, ServerMessage};

use super::context::{HandlerContext, HandlerResult};

#[derive(Serialize)]
struct GameEventsPayload<'a> {
    events: &'a [game::GameEvent],
}

pub async fn handle(ctx: HandlerContext) -> HandlerResult {
    let (Some(user_id), Some(room_id)) = (ctx.user_id, ctx.manager.room_of(ctx.connection_id)) else {
        return HandlerResult::err(ServerMessage::typed_error(MessageType::GameError, "NOT_IN_ROOM", "not seated in a room"));
    };

    let action: GameAction = match ctx.message.payload.clone() {
        Some(v) => match serde_json::from_value(v) {
            Ok(a) => a,
            Err(e) => return HandlerResult::err(ServerMessage::typed_error(MessageType::GameError, "VALIDATION_ERROR", e.to_string())),
        },
        None => return HandlerResult::err(ServerMessage::typed_error(MessageType::GameError, "VALIDATION_ERROR", "game_action requires a payload")),
    };

    let Some(state) = ctx.rooms.game_state(room_id) else {
        return HandlerResult::err(ServerMessage::typed_error(MessageType::GameError, "GAME_NOT_STARTED", "game has not started"));
    };

    let result = game::process_action(&state, &action, user_id);
    if !result.success {
        let code = result.error_code.unwrap_or("UNKNOWN");
        let message = result.error_message.unwrap_or_default();
        return HandlerResult::err(ServerMessage::typed_error(MessageType::GameError, code, message).with_request_id(ctx.message.request_id));
    }

    if let Some(new_state) = result.state {
        ctx.rooms.set_game_state(room_id, new_state);
    }

    let events = ServerMessage::new(MessageType::GameEvents, GameEventsPayload { events: &result.events }).with_request_id(ctx.message.request_id);
    HandlerResult::ok_with_broadcast(Some(events.clone()), events, room_id)
}
