use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Open,
    ReadyToStart,
    InGame,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRow {
    pub room_id: Uuid,
    pub code: String,
    pub status: RoomStatus,
    pub visibility: String,
    pub owner_user_id: Uuid,
    pub max_players: u8,
    pub ruleset_id: String,
    pub ruleset_config: serde_json::Value,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatRow {
    pub room_id: Uuid,
    pub seat_index: u8,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateRoomOutcome {
    pub room_id: Uuid,
    pub code: String,
    pub seat_index: u8,
    pub is_host: bool,
    pub cached: bool,
}
