//! HTTP wrapping (A4): thin routes over C1/C2/C4 per SPEC_FULL.md §6.
//! No business logic lives here — every handler is extract, call a
//! service/adapter method, serialize the result.

mod auth;
mod extractors;
mod health;
mod profile;
mod rooms;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/profile", get(profile::get_profile).patch(profile::update_profile))
        .route("/api/v1/rooms", post(rooms::create_room))
        .route("/api/v1/rooms/join", post(rooms::join_room))
}
