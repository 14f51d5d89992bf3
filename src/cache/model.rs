use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::RoomStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMeta {
    pub status: RoomStatus,
    pub visibility: String,
    pub owner_user_id: Uuid,
    pub code: String,
    pub max_players: u8,
    pub ruleset_id: String,
    pub ruleset_config: serde_json::Value,
    pub created_at_ms: i64,
    pub version: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatMeta {
    pub user_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub ready: bool,
    pub connected: bool,
    pub is_host: bool,
    pub joined_at_ms: i64,
}

#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub room_id: Uuid,
    pub meta: RoomMeta,
    pub seats: Vec<SeatMeta>,
}
