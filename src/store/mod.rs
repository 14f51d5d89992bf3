//! Durable-store adapter (C2): typed wrappers around the RPC surface a real
//! relational database would expose. Defined as a trait so the transport
//! stays swappable; [`memory::InMemoryStore`] is the in-process reference
//! implementation used by this repository instead of a live database
//! connection (see DESIGN.md).

mod memory;
mod model;

pub use memory::InMemoryStore;
pub use model::{CreateRoomOutcome, ProfileRow, RoomRow, RoomStatus, SeatRow};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;

#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Idempotent by `request_id`: replaying the same id returns the
    /// original outcome instead of creating a second room.
    async fn create_room(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        visibility: &str,
        max_players: u8,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) -> Result<CreateRoomOutcome, StoreError>;

    /// Returns the caller's existing open room if any, else creates one.
    async fn find_or_create_room(
        &self,
        user_id: Uuid,
        max_players: u8,
        visibility: &str,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) -> Result<CreateRoomOutcome, StoreError>;

    /// Optimistic-lock write: assignment only succeeds if the seat's
    /// `user_id` is currently `None`; clearing (passing `None`) carries no
    /// such guard.
    async fn update_seat(&self, room_id: Uuid, seat_index: u8, new_user_id: Option<Uuid>) -> Result<bool, StoreError>;

    async fn set_status(&self, room_id: Uuid, status: RoomStatus) -> Result<(), StoreError>;

    async fn find_by_code(&self, code: &str) -> Result<RoomRow, StoreError>;

    async fn find_by_id(&self, room_id: Uuid) -> Result<RoomRow, StoreError>;

    async fn seat_exists(&self, room_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Profile rows are keyed by `user_id` and created on first touch —
    /// there is no separate signup flow in this core, identity comes from
    /// the verified token (SPEC_FULL.md §4.1).
    async fn get_profile(&self, user_id: Uuid) -> Result<ProfileRow, StoreError>;

    async fn update_display_name(&self, user_id: Uuid, display_name: Option<String>) -> Result<ProfileRow, StoreError>;
}
