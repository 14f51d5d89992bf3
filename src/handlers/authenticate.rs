use serde::Deserialize;
use tracing::warn;

use crate::error::ErrorCode;
use crate::protocol::{MessageType, ServerMessage};

use super::context::{HandlerContext, HandlerResult};

#[derive(Deserialize)]
struct AuthenticatePayload {
    token: String,
    room_code: String,
}

pub async fn handle(ctx: HandlerContext) -> HandlerResult {
    let Some(payload) = ctx.message.payload.clone() else {
        return HandlerResult::err(ServerMessage::error("INVALID_MESSAGE", "authenticate requires a payload"));
    };
    let payload: AuthenticatePayload = match serde_json::from_value(payload) {
        Ok(p) => p,
        Err(e) => return HandlerResult::err(ServerMessage::error("VALIDATION_ERROR", e.to_string())),
    };

    let identity = match ctx.verifier.verify(&payload.token).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(connection_id = %ctx.connection_id, error = %e, "authenticate rejected");
            let code = if matches!(e, crate::error::AuthError::Expired) { "AUTH_EXPIRED" } else { "AUTH_FAILED" };
            return HandlerResult::err(ServerMessage::error(code, e.to_string()));
        }
    };

    let view = match ctx.rooms.join_room(identity.user_id, &payload.room_code, None).await {
        Ok(view) => view,
        Err(e) => return HandlerResult::err(ServerMessage::error(e.error_code(), e.to_string())),
    };

    if let Err(e) = ctx.manager.authenticate(ctx.connection_id, identity.user_id, Some(view.room_id)) {
        return HandlerResult::err(ServerMessage::error(e.error_code(), e.to_string()));
    }

    let ack = ServerMessage::new(MessageType::Authenticated, &view).with_request_id(ctx.message.request_id);
    ctx.manager.send_to_connection(ctx.connection_id, ack);

    HandlerResult::ok_with_broadcast(None, ServerMessage::new(MessageType::RoomUpdated, view.clone()), view.room_id)
}
