use serde::Serialize;
use time::OffsetDateTime;

use crate::protocol::{MessageType, ServerMessage};

use super::context::{HandlerContext, HandlerResult};

#[derive(Serialize)]
struct PongPayload {
    server_time: String,
}

pub fn handle(ctx: &HandlerContext) -> HandlerResult {
    let server_time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    let reply = ServerMessage::new(MessageType::Pong, PongPayload { server_time }).with_request_id(ctx.message.request_id);
    HandlerResult::ok(Some(reply))
}
