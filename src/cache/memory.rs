//! In-process reference implementation of [`CacheAdapter`], grounded on the
//! original ruleset's Redis-backed `RoomService` (`room:{id}:meta`,
//! `room:{id}:seats`, `room:{id}:presence`). A per-room `parking_lot::Mutex`
//! stands in for the atomic Lua script the real cache would run server-side:
//! every seat/meta mutation takes the lock for its whole decode-mutate-encode
//! cycle, so concurrent `ready`/`connected` toggles never lose a write.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::CacheError;
use crate::store::RoomStatus;

use super::model::{RoomMeta, RoomSnapshot, SeatMeta};
use super::CacheAdapter;

struct RoomCacheEntry {
    meta: RoomMeta,
    seats: Vec<SeatMeta>,
    presence: HashSet<Uuid>,
}

pub struct InMemoryCache {
    rooms: DashMap<Uuid, Mutex<RoomCacheEntry>>,
    conn_counts: DashMap<Uuid, i64>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self { rooms: DashMap::new(), conn_counts: DashMap::new() }
    }
}

#[async_trait]
impl CacheAdapter for InMemoryCache {
    async fn init_room(&self, room_id: Uuid, meta: RoomMeta, seats: Vec<SeatMeta>) {
        self.rooms.insert(room_id, Mutex::new(RoomCacheEntry { meta, seats, presence: HashSet::new() }));
    }

    async fn get_snapshot(&self, room_id: Uuid) -> Result<RoomSnapshot, CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        let guard = entry.lock();
        Ok(RoomSnapshot { room_id, meta: guard.meta.clone(), seats: guard.seats.clone() })
    }

    async fn write_seat(&self, room_id: Uuid, seat_index: u8, seat: SeatMeta) -> Result<(), CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        let mut guard = entry.lock();
        let slot = guard
            .seats
            .get_mut(seat_index as usize)
            .ok_or_else(|| CacheError::Internal(format!("seat {seat_index} out of range")))?;
        *slot = seat;
        Ok(())
    }

    async fn set_seat_ready(&self, room_id: Uuid, seat_index: u8, ready: bool) -> Result<(), CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        let mut guard = entry.lock();
        let slot = guard
            .seats
            .get_mut(seat_index as usize)
            .ok_or_else(|| CacheError::Internal(format!("seat {seat_index} out of range")))?;
        slot.ready = ready;
        Ok(())
    }

    async fn set_seat_connected(&self, room_id: Uuid, seat_index: u8, connected: bool) -> Result<(), CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        let mut guard = entry.lock();
        let slot = guard
            .seats
            .get_mut(seat_index as usize)
            .ok_or_else(|| CacheError::Internal(format!("seat {seat_index} out of range")))?;
        slot.connected = connected;
        Ok(())
    }

    async fn clear_seat(&self, room_id: Uuid, seat_index: u8) -> Result<(), CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        let mut guard = entry.lock();
        let slot = guard
            .seats
            .get_mut(seat_index as usize)
            .ok_or_else(|| CacheError::Internal(format!("seat {seat_index} out of range")))?;
        *slot = SeatMeta::default();
        Ok(())
    }

    async fn set_status(&self, room_id: Uuid, status: RoomStatus) -> Result<(), CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        entry.lock().meta.status = status;
        Ok(())
    }

    async fn bump_version(&self, room_id: Uuid) -> Result<u64, CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        let mut guard = entry.lock();
        guard.meta.version += 1;
        Ok(guard.meta.version)
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<(), CacheError> {
        self.rooms.remove(&room_id);
        Ok(())
    }

    async fn presence_add(&self, room_id: Uuid, user_id: Uuid) -> Result<(), CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        entry.lock().presence.insert(user_id);
        Ok(())
    }

    async fn presence_remove(&self, room_id: Uuid, user_id: Uuid) -> Result<(), CacheError> {
        let entry = self.rooms.get(&room_id).ok_or(CacheError::NotFound)?;
        entry.lock().presence.remove(&user_id);
        Ok(())
    }

    async fn conn_count_incr(&self, user_id: Uuid) -> i64 {
        let mut count = self.conn_counts.entry(user_id).or_insert(0);
        *count += 1;
        *count
    }

    async fn conn_count_decr(&self, user_id: Uuid) -> i64 {
        let Some(mut count) = self.conn_counts.get_mut(&user_id) else { return 0 };
        *count -= 1;
        let value = *count;
        if value <= 0 {
            drop(count);
            self.conn_counts.remove(&user_id);
        }
        value
    }
}
