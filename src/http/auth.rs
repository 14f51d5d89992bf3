use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use super::extractors::CurrentUser;

#[derive(Serialize)]
pub struct AuthUser {
    id: Uuid,
}

pub async fn me(CurrentUser(user_id): CurrentUser) -> Json<AuthUser> {
    Json(AuthUser { id: user_id })
}
