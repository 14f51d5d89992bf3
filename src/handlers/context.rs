//! Handler context and result triplet (C7 §4.7), grounded on the original
//! ruleset's `HandlerContext`/`HandlerResult` but with the manager/room
//! service/verifier handles passed in explicitly rather than resolved from
//! process-wide globals (see SPEC_FULL.md §9 on explicit handles).

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::TokenVerifier;
use crate::connection::ConnectionManager;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::RoomService;

pub struct HandlerContext {
    pub connection_id: Uuid,
    pub user_id: Option<Uuid>,
    pub message: ClientMessage,
    pub manager: Arc<ConnectionManager>,
    pub rooms: Arc<RoomService>,
    pub verifier: Arc<TokenVerifier>,
}

#[derive(Default)]
pub struct HandlerResult {
    pub success: bool,
    pub reply: Option<ServerMessage>,
    pub broadcast: Option<ServerMessage>,
    pub room_id: Option<Uuid>,
}

impl HandlerResult {
    pub fn ok(reply: Option<ServerMessage>) -> Self {
        Self { success: true, reply, broadcast: None, room_id: None }
    }

    pub fn ok_with_broadcast(reply: Option<ServerMessage>, broadcast: ServerMessage, room_id: Uuid) -> Self {
        Self { success: true, reply, broadcast: Some(broadcast), room_id: Some(room_id) }
    }

    pub fn err(reply: ServerMessage) -> Self {
        Self { success: false, reply: Some(reply), broadcast: None, room_id: None }
    }
}
