//! In-process reference implementation of [`DurableStore`], grounded on the
//! original ruleset's Supabase RPCs (`create_room`, `find_or_create_room`,
//! `rooms.update_seat` with its `.is_("user_id", "null")` optimistic lock).
//! Honors the same contracts — idempotency, collision retry, optimistic
//! locking — without a live database connection.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use uuid::Uuid;

use crate::error::StoreError;

use super::model::{CreateRoomOutcome, ProfileRow, RoomRow, RoomStatus, SeatRow};
use super::DurableStore;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;
const MAX_CODE_ATTEMPTS: u32 = 20;

struct RoomRecord {
    row: Mutex<RoomRow>,
    seats: Mutex<Vec<SeatRow>>,
}

pub struct InMemoryStore {
    rooms: DashMap<Uuid, RoomRecord>,
    codes: DashMap<String, Uuid>,
    /// caller's open room, by owner — mirrors `find_or_create_room`'s lookup.
    open_room_by_owner: DashMap<Uuid, Uuid>,
    idempotency: DashMap<Uuid, CreateRoomOutcome>,
    profiles: DashMap<Uuid, ProfileRow>,
    clock_ms: AtomicI64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            codes: DashMap::new(),
            open_room_by_owner: DashMap::new(),
            idempotency: DashMap::new(),
            profiles: DashMap::new(),
            clock_ms: AtomicI64::new(0),
        }
    }

    fn next_ms(&self) -> i64 {
        self.clock_ms.fetch_add(1, Ordering::Relaxed)
    }

    fn generate_code(&self) -> Result<String, StoreError> {
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if !self.codes.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(StoreError::CodeCollision)
    }

    fn insert_room(
        &self,
        user_id: Uuid,
        visibility: &str,
        max_players: u8,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) -> Result<CreateRoomOutcome, StoreError> {
        let code = self.generate_code()?;
        let room_id = Uuid::new_v4();
        let row = RoomRow {
            room_id,
            code: code.clone(),
            status: RoomStatus::Open,
            visibility: visibility.to_string(),
            owner_user_id: user_id,
            max_players,
            ruleset_id: ruleset_id.to_string(),
            ruleset_config,
            created_at_ms: self.next_ms(),
        };
        let mut seats = Vec::with_capacity(max_players as usize);
        seats.push(SeatRow { room_id, seat_index: 0, user_id: Some(user_id) });
        for seat_index in 1..max_players {
            seats.push(SeatRow { room_id, seat_index, user_id: None });
        }

        self.rooms.insert(room_id, RoomRecord { row: Mutex::new(row), seats: Mutex::new(seats) });
        self.codes.insert(code.clone(), room_id);
        self.open_room_by_owner.insert(user_id, room_id);

        Ok(CreateRoomOutcome { room_id, code, seat_index: 0, is_host: true, cached: false })
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    async fn create_room(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        visibility: &str,
        max_players: u8,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) -> Result<CreateRoomOutcome, StoreError> {
        if let Some(outcome) = self.idempotency.get(&request_id) {
            return Ok(outcome.clone());
        }
        let outcome = self.insert_room(user_id, visibility, max_players, ruleset_id, ruleset_config)?;
        self.idempotency.insert(request_id, outcome.clone());
        Ok(outcome)
    }

    async fn find_or_create_room(
        &self,
        user_id: Uuid,
        max_players: u8,
        visibility: &str,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) -> Result<CreateRoomOutcome, StoreError> {
        if let Some(room_id) = self.open_room_by_owner.get(&user_id).map(|r| *r) {
            if let Some(record) = self.rooms.get(&room_id) {
                let row = record.row.lock();
                if row.status == RoomStatus::Open {
                    return Ok(CreateRoomOutcome {
                        room_id: row.room_id,
                        code: row.code.clone(),
                        seat_index: 0,
                        is_host: true,
                        cached: true,
                    });
                }
            }
        }
        self.insert_room(user_id, visibility, max_players, ruleset_id, ruleset_config)
    }

    async fn update_seat(&self, room_id: Uuid, seat_index: u8, new_user_id: Option<Uuid>) -> Result<bool, StoreError> {
        let record = self.rooms.get(&room_id).ok_or(StoreError::RoomNotFound)?;
        let mut seats = record.seats.lock();
        let seat = seats
            .iter_mut()
            .find(|s| s.seat_index == seat_index)
            .ok_or_else(|| StoreError::Internal(format!("seat {seat_index} out of range")))?;

        match new_user_id {
            Some(_) => {
                if seat.user_id.is_some() {
                    return Ok(false);
                }
                seat.user_id = new_user_id;
                Ok(true)
            }
            None => {
                seat.user_id = None;
                Ok(true)
            }
        }
    }

    async fn set_status(&self, room_id: Uuid, status: RoomStatus) -> Result<(), StoreError> {
        let record = self.rooms.get(&room_id).ok_or(StoreError::RoomNotFound)?;
        record.row.lock().status = status;
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<RoomRow, StoreError> {
        let room_id = *self.codes.get(&code.to_uppercase()).ok_or(StoreError::RoomNotFound)?;
        self.find_by_id(room_id).await
    }

    async fn find_by_id(&self, room_id: Uuid) -> Result<RoomRow, StoreError> {
        let record = self.rooms.get(&room_id).ok_or(StoreError::RoomNotFound)?;
        Ok(record.row.lock().clone())
    }

    async fn seat_exists(&self, room_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let record = self.rooms.get(&room_id).ok_or(StoreError::RoomNotFound)?;
        Ok(record.seats.lock().iter().any(|s| s.user_id == Some(user_id)))
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<ProfileRow, StoreError> {
        Ok(self
            .profiles
            .entry(user_id)
            .or_insert_with(|| ProfileRow { user_id, display_name: None, avatar_url: None })
            .clone())
    }

    async fn update_display_name(&self, user_id: Uuid, display_name: Option<String>) -> Result<ProfileRow, StoreError> {
        let mut entry = self
            .profiles
            .entry(user_id)
            .or_insert_with(|| ProfileRow { user_id, display_name: None, avatar_url: None });
        entry.display_name = display_name;
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_room_is_idempotent_by_request_id() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let request_id = Uuid::new_v4();
        let a = store.create_room(user_id, request_id, "private", 4, "classic", serde_json::json!({})).await.unwrap();
        let b = store.create_room(user_id, request_id, "private", 4, "classic", serde_json::json!({})).await.unwrap();
        assert_eq!(a.room_id, b.room_id);
    }

    #[tokio::test]
    async fn update_seat_honors_optimistic_lock() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let outcome = store.create_room(owner, Uuid::new_v4(), "private", 4, "classic", serde_json::json!({})).await.unwrap();

        let first = Uuid::new_v4();
        assert!(store.update_seat(outcome.room_id, 1, Some(first)).await.unwrap());

        let second = Uuid::new_v4();
        assert!(!store.update_seat(outcome.room_id, 1, Some(second)).await.unwrap());
    }
}
