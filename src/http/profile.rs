use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::extractors::CurrentUser;

#[derive(Serialize)]
pub struct ProfileResponse {
    id: uuid::Uuid,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

impl From<crate::store::ProfileRow> for ProfileResponse {
    fn from(row: crate::store::ProfileRow) -> Self {
        Self { id: row.user_id, display_name: row.display_name, avatar_url: row.avatar_url }
    }
}

pub async fn get_profile(State(state): State<AppState>, CurrentUser(user_id): CurrentUser) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let row = state.store.get_profile(user_id).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(row.into()))
}

#[derive(Deserialize)]
pub struct ProfileUpdate {
    display_name: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let row = state
        .store
        .update_display_name(user_id, body.display_name)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(row.into()))
}
