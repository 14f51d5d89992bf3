//! Cache adapter (C3): typed wrappers for the room-meta hash, seat hash, and
//! presence set a remote key-value store would hold. Defined as a trait so
//! the transport stays swappable; [`memory::InMemoryCache`] is the
//! in-process reference implementation used by this repository (see
//! DESIGN.md). Seat mutations go through a single atomic
//! decode/mutate/encode cycle per room, the in-process stand-in for what a
//! server-side Lua/Redis function would guarantee remotely.

mod memory;
mod model;

pub use memory::InMemoryCache;
pub use model::{RoomMeta, RoomSnapshot, SeatMeta};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CacheError;

#[async_trait]
pub trait CacheAdapter: Send + Sync {
    async fn init_room(&self, room_id: Uuid, meta: RoomMeta, seats: Vec<SeatMeta>);

    async fn get_snapshot(&self, room_id: Uuid) -> Result<RoomSnapshot, CacheError>;

    /// Read-modify-write writes below all go through the same per-room
    /// atomic decode/mutate/encode cycle; kept as discrete methods (rather
    /// than a generic `mutate_seat(closure)`) so the trait stays object-safe.
    async fn write_seat(&self, room_id: Uuid, seat_index: u8, seat: SeatMeta) -> Result<(), CacheError>;

    async fn set_seat_ready(&self, room_id: Uuid, seat_index: u8, ready: bool) -> Result<(), CacheError>;

    async fn set_seat_connected(&self, room_id: Uuid, seat_index: u8, connected: bool) -> Result<(), CacheError>;

    async fn clear_seat(&self, room_id: Uuid, seat_index: u8) -> Result<(), CacheError>;

    async fn set_status(&self, room_id: Uuid, status: crate::store::RoomStatus) -> Result<(), CacheError>;

    async fn bump_version(&self, room_id: Uuid) -> Result<u64, CacheError>;

    async fn delete_room(&self, room_id: Uuid) -> Result<(), CacheError>;

    async fn presence_add(&self, room_id: Uuid, user_id: Uuid) -> Result<(), CacheError>;

    async fn presence_remove(&self, room_id: Uuid, user_id: Uuid) -> Result<(), CacheError>;

    /// `INCR` the per-user connection counter used for distributed presence.
    async fn conn_count_incr(&self, user_id: Uuid) -> i64;

    /// `DECR`; when the result is `<= 0` the key is dropped, mirroring the
    /// real store's TTL-key cleanup.
    async fn conn_count_decr(&self, user_id: Uuid) -> i64;
}
