//! Bearer-token extraction for HTTP routes, grounded on the original
//! ruleset's `CurrentUser` FastAPI dependency: every protected route needs
//! the same "pull Authorization header, verify, yield the sub claim" step,
//! so it's an extractor instead of being repeated in each handler.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::state::AppState;

pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("MISSING_TOKEN", "missing Authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("MISSING_TOKEN", "Authorization header must be a bearer token"))?;

        let identity = state.verifier.verify(token).await.map_err(|e| unauthorized(e.error_code(), e.to_string()))?;
        Ok(CurrentUser(identity.user_id))
    }
}

fn unauthorized(code: &str, message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"error_code": code, "message": message.into()})))
}
