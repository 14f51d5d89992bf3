use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::room::RoomView;
use crate::state::AppState;

use super::extractors::CurrentUser;

#[derive(Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default = "default_max_players")]
    n_players: u8,
}

fn default_max_players() -> u8 {
    4
}

#[derive(Serialize)]
pub struct SeatInfo {
    seat_index: u8,
    is_host: bool,
}

#[derive(Serialize)]
pub struct CreateRoomResponse {
    room: RoomView,
    seat: SeatInfo,
    cached: bool,
}

pub async fn create_room(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, (StatusCode, String)> {
    let created = state
        .rooms
        .find_or_create_room(user_id, None, req.n_players, "classic", serde_json::json!({}))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(CreateRoomResponse {
        cached: created.cached,
        seat: SeatInfo { seat_index: created.seat_index, is_host: created.is_host },
        room: created.view,
    }))
}

#[derive(Deserialize)]
pub struct JoinRoomRequest {
    room_code: String,
}

pub async fn join_room(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<JoinRoomRequest>,
) -> Result<Json<RoomView>, (StatusCode, String)> {
    let view = state
        .rooms
        .join_room(user_id, &req.room_code, None)
        .await
        .map_err(|e| (StatusCode::from_u16(status_for(e.error_code())).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), e.to_string()))?;
    Ok(Json(view))
}

fn status_for(code: &str) -> u16 {
    match code {
        "ROOM_NOT_FOUND" => 404,
        "ROOM_CLOSED" | "ROOM_IN_GAME" | "ROOM_FULL" => 409,
        _ => 500,
    }
}
