use std::time::Instant;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::ServerMessage;

/// What the per-connection forwarding task (owned by C9) should do next.
/// A plain `ServerMessage` channel can't express "close the socket", so C5
/// hands the socket-owning task directives instead of raw frames.
#[derive(Debug, Clone)]
pub enum Outbound {
    Message(ServerMessage),
    Close(u16),
}

pub struct Connection {
    pub connection_id: Uuid,
    pub user_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub authenticated: bool,
    pub connected_at: Instant,
    pub last_heartbeat: Instant,
    pub(super) tx: mpsc::UnboundedSender<Outbound>,
}

impl Connection {
    pub fn new(connection_id: Uuid, tx: mpsc::UnboundedSender<Outbound>) -> Self {
        let now = Instant::now();
        Self { connection_id, user_id: None, room_id: None, authenticated: false, connected_at: now, last_heartbeat: now, tx }
    }
}
