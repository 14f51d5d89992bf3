use serde::Serialize;
use uuid::Uuid;

use crate::cache::{RoomMeta, SeatMeta};
use crate::store::RoomStatus;

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub seat_index: u8,
    pub user_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub ready: bool,
    pub connected: bool,
    pub is_host: bool,
}

impl SeatView {
    pub fn from_meta(seat_index: u8, meta: &SeatMeta) -> Self {
        Self {
            seat_index,
            user_id: meta.user_id,
            display_name: meta.display_name.clone(),
            ready: meta.ready,
            connected: meta.connected,
            is_host: meta.is_host,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub room_id: Uuid,
    pub code: String,
    pub status: RoomStatus,
    pub visibility: String,
    pub ruleset_id: String,
    pub max_players: u8,
    pub seats: Vec<SeatView>,
    pub version: u64,
}

impl RoomView {
    pub fn from_parts(room_id: Uuid, meta: &RoomMeta, seats: &[SeatMeta]) -> Self {
        Self {
            room_id,
            code: meta.code.clone(),
            status: meta.status,
            visibility: meta.visibility.clone(),
            ruleset_id: meta.ruleset_id.clone(),
            max_players: meta.max_players,
            seats: seats.iter().enumerate().map(|(i, s)| SeatView::from_meta(i as u8, s)).collect(),
            version: meta.version,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    HostLeft,
    PlayerLeft,
}
