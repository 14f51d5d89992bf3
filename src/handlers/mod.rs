//! Dispatch table mapping an incoming `MessageType` to its handler (C7
//! §4.7), grounded on the original ruleset's handler registry in
//! `app/services/websocket/manager.py` (`_dispatch`).

pub mod context;

mod authenticate;
mod create_room;
mod game_action;
mod join_room;
mod leave_room;
mod ping;
mod ready;
mod start_game;

pub use context::{HandlerContext, HandlerResult};

use crate::protocol::MessageType;

/// Dispatches a parsed client message to its handler. Messages that require
/// an authenticated connection but arrive before `authenticate` are rejected
/// by the individual handlers, not here, so the error payload can carry the
/// message-specific error type (e.g. `create_room_error`).
pub async fn dispatch(ctx: HandlerContext) -> HandlerResult {
    match ctx.message.message_type {
        MessageType::Authenticate => authenticate::handle(ctx).await,
        MessageType::Ping => ping::handle(&ctx),
        MessageType::CreateRoom => create_room::handle(ctx).await,
        MessageType::JoinRoom => join_room::handle(ctx).await,
        MessageType::ToggleReady => ready::handle(ctx).await,
        MessageType::LeaveRoom => leave_room::handle(ctx).await,
        MessageType::StartGame => start_game::handle(ctx).await,
        MessageType::GameAction => game_action::handle(ctx).await,
        other => HandlerResult::err(crate::protocol::ServerMessage::error(
            "VALIDATION_ERROR",
            format!("unsupported message type: {other:?}"),
        )),
    }
}
