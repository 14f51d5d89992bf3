//! Room lifecycle state machine (C4), grounded on the original ruleset's
//! `RoomService` but reshaped around the two adapters of §4.2/§4.3 instead
//! of direct Supabase/Redis clients, and extended with the `toggle_ready`/
//! `start_game`/`leave_room`/`disconnect_cleanup` transitions SPEC_FULL.md
//! §4.4 adds on top of what the Python service implements.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{CacheAdapter, RoomMeta, SeatMeta};
use crate::error::RoomError;
use crate::game::{self, GameSettings, GameState, PlayerAttributes};
use crate::store::{DurableStore, RoomStatus};

use super::model::{LeaveReason, RoomView};

const PALETTE: [&str; 4] = ["red", "green", "yellow", "blue"];

pub struct CreatedRoom {
    pub view: RoomView,
    pub seat_index: u8,
    pub is_host: bool,
    pub cached: bool,
}

pub struct RoomService {
    store: Arc<dyn DurableStore>,
    cache: Arc<dyn CacheAdapter>,
    games: DashMap<Uuid, Mutex<GameState>>,
}

impl RoomService {
    pub fn new(store: Arc<dyn DurableStore>, cache: Arc<dyn CacheAdapter>) -> Self {
        Self { store, cache, games: DashMap::new() }
    }

    async fn view(&self, room_id: Uuid) -> Result<RoomView, RoomError> {
        let snapshot = self.cache.get_snapshot(room_id).await?;
        Ok(RoomView::from_parts(room_id, &snapshot.meta, &snapshot.seats))
    }

    pub async fn create_room(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        display_name: Option<String>,
        max_players: u8,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) -> Result<CreatedRoom, RoomError> {
        let outcome = self
            .store
            .create_room(user_id, request_id, "private", max_players, ruleset_id, ruleset_config.clone())
            .await?;

        if !outcome.cached {
            self.hydrate_cache(user_id, display_name, max_players, &outcome, ruleset_id, ruleset_config).await;
        }

        let view = self.view(outcome.room_id).await?;
        Ok(CreatedRoom { view, seat_index: outcome.seat_index, is_host: outcome.is_host, cached: outcome.cached })
    }

    async fn hydrate_cache(
        &self,
        owner_user_id: Uuid,
        display_name: Option<String>,
        max_players: u8,
        outcome: &crate::store::CreateRoomOutcome,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) {
        let meta = RoomMeta {
            status: RoomStatus::Open,
            visibility: "private".into(),
            owner_user_id,
            code: outcome.code.clone(),
            max_players,
            ruleset_id: ruleset_id.into(),
            ruleset_config,
            created_at_ms: 0,
            version: 0,
        };
        let mut seats = vec![SeatMeta::default(); max_players as usize];
        seats[0] = SeatMeta { user_id: Some(owner_user_id), display_name, ready: false, connected: true, is_host: true, joined_at_ms: 0 };
        self.cache.init_room(outcome.room_id, meta, seats).await;
        info!(room_id = %outcome.room_id, code = %outcome.code, "room cache hydrated");
    }

    /// Backs `POST /api/v1/rooms`: returns the caller's existing open room
    /// if the durable store has one, otherwise creates a fresh one.
    pub async fn find_or_create_room(
        &self,
        user_id: Uuid,
        display_name: Option<String>,
        max_players: u8,
        ruleset_id: &str,
        ruleset_config: serde_json::Value,
    ) -> Result<CreatedRoom, RoomError> {
        let outcome = self.store.find_or_create_room(user_id, max_players, "private", ruleset_id, ruleset_config.clone()).await?;

        if !outcome.cached {
            self.hydrate_cache(user_id, display_name, max_players, &outcome, ruleset_id, ruleset_config).await;
        }

        let view = self.view(outcome.room_id).await?;
        Ok(CreatedRoom { view, seat_index: outcome.seat_index, is_host: outcome.is_host, cached: outcome.cached })
    }

    pub async fn join_room(&self, user_id: Uuid, code: &str, display_name: Option<String>) -> Result<RoomView, RoomError> {
        let row = self.store.find_by_code(code).await?;
        if row.status == RoomStatus::Closed {
            return Err(crate::error::StoreError::RoomClosed.into());
        }
        if row.status == RoomStatus::InGame && !self.store.seat_exists(row.room_id, user_id).await? {
            return Err(crate::error::StoreError::RoomInGame.into());
        }

        let snapshot = self.cache.get_snapshot(row.room_id).await?;
        if let Some(existing) = snapshot.seats.iter().position(|s| s.user_id == Some(user_id)) {
            self.cache.set_seat_connected(row.room_id, existing as u8, true).await?;
            self.cache.bump_version(row.room_id).await?;
            return self.view(row.room_id).await;
        }

        let Some(seat_index) = snapshot.seats.iter().position(|s| s.user_id.is_none()) else {
            return Err(crate::error::StoreError::RoomFull.into());
        };
        let seat_index = seat_index as u8;

        let assigned = self.store.update_seat(row.room_id, seat_index, Some(user_id)).await?;
        if !assigned {
            return Err(RoomError::Store(crate::error::StoreError::Internal("seat race".into())));
        }

        let seat = SeatMeta { user_id: Some(user_id), display_name, ready: false, connected: true, is_host: false, joined_at_ms: 0 };
        if let Err(e) = self.cache.write_seat(row.room_id, seat_index, seat).await {
            warn!(room_id = %row.room_id, seat_index, error = %e, "cache seat write failed, rolling back durable assignment");
            let _ = self.store.update_seat(row.room_id, seat_index, None).await;
            return Err(RoomError::Store(crate::error::StoreError::Internal("cache rollback".into())));
        }

        self.cache.presence_add(row.room_id, user_id).await?;
        self.cache.bump_version(row.room_id).await?;
        self.view(row.room_id).await
    }

    pub async fn toggle_ready(&self, room_id: Uuid, user_id: Uuid) -> Result<RoomView, RoomError> {
        let snapshot = self.cache.get_snapshot(room_id).await?;
        if !matches!(snapshot.meta.status, RoomStatus::Open | RoomStatus::ReadyToStart) {
            return Err(RoomError::InvalidRoomState);
        }
        let seat_index = snapshot.seats.iter().position(|s| s.user_id == Some(user_id)).ok_or(RoomError::NotSeated)? as u8;
        let was_ready = snapshot.seats[seat_index as usize].ready;
        self.cache.set_seat_ready(room_id, seat_index, !was_ready).await?;

        let snapshot = self.cache.get_snapshot(room_id).await?;
        let occupied: Vec<_> = snapshot.seats.iter().filter(|s| s.user_id.is_some()).collect();
        let all_ready = occupied.len() >= 2 && occupied.iter().all(|s| s.ready);
        let next_status = if all_ready { RoomStatus::ReadyToStart } else { RoomStatus::Open };
        if next_status != snapshot.meta.status {
            self.cache.set_status(room_id, next_status).await?;
        }
        self.cache.bump_version(room_id).await?;
        self.view(room_id).await
    }

    pub async fn start_game(&self, room_id: Uuid, host_user_id: Uuid) -> Result<(RoomView, GameState), RoomError> {
        let snapshot = self.cache.get_snapshot(room_id).await?;
        if snapshot.meta.status != RoomStatus::ReadyToStart {
            return Err(RoomError::InvalidRoomState);
        }
        if snapshot.meta.owner_user_id != host_user_id {
            return Err(RoomError::NotHost);
        }

        let occupied: Vec<_> = snapshot.seats.iter().filter(|s| s.user_id.is_some()).collect();
        if occupied.len() < 2 || !occupied.iter().all(|s| s.ready) {
            return Err(RoomError::PlayersNotReady);
        }

        let player_attributes = occupied
            .iter()
            .enumerate()
            .map(|(i, seat)| PlayerAttributes {
                player_id: seat.user_id.expect("filtered to occupied seats"),
                name: seat.display_name.clone().unwrap_or_else(|| format!("Player {}", i + 1)),
                color: PALETTE[i % PALETTE.len()].to_string(),
            })
            .collect();

        let settings = GameSettings { num_players: occupied.len(), player_attributes };
        let state = game::initialize_game(&settings)
            .map_err(|e| RoomError::Store(crate::error::StoreError::Internal(e.message.to_string())))?;
        let start_result = game::process_action(&state, &game::GameAction::StartGame, host_user_id);
        let state = start_result.state.unwrap_or(state);

        self.store.set_status(room_id, RoomStatus::InGame).await?;
        self.cache.set_status(room_id, RoomStatus::InGame).await?;
        self.cache.bump_version(room_id).await?;
        self.games.insert(room_id, Mutex::new(state.clone()));

        info!(%room_id, players = occupied.len(), "game started");
        Ok((self.view(room_id).await?, state))
    }

    pub fn game_state(&self, room_id: Uuid) -> Option<GameState> {
        self.games.get(&room_id).map(|g| g.lock().clone())
    }

    pub fn set_game_state(&self, room_id: Uuid, state: GameState) {
        self.games.entry(room_id).or_insert_with(|| Mutex::new(state.clone())).lock().clone_from(&state);
    }

    pub async fn leave_room(&self, room_id: Uuid, user_id: Uuid) -> Result<(RoomView, LeaveReason), RoomError> {
        let snapshot = self.cache.get_snapshot(room_id).await?;
        let seat_index = snapshot.seats.iter().position(|s| s.user_id == Some(user_id));

        if snapshot.meta.owner_user_id == user_id {
            self.store.set_status(room_id, RoomStatus::Closed).await?;
            let view = self.view(room_id).await?;
            self.cache.delete_room(room_id).await?;
            self.games.remove(&room_id);
            info!(%room_id, %user_id, "host left, room closed");
            return Ok((view, LeaveReason::HostLeft));
        }

        let Some(seat_index) = seat_index else { return Err(RoomError::NotSeated) };
        self.store.update_seat(room_id, seat_index as u8, None).await?;
        self.cache.clear_seat(room_id, seat_index as u8).await?;
        self.reset_readiness_and_revert(room_id).await?;
        self.cache.presence_remove(room_id, user_id).await?;
        self.cache.bump_version(room_id).await?;
        Ok((self.view(room_id).await?, LeaveReason::PlayerLeft))
    }

    pub async fn disconnect_cleanup(&self, room_id: Uuid, user_id: Uuid) -> Result<RoomView, RoomError> {
        let snapshot = self.cache.get_snapshot(room_id).await?;
        if let Some(seat_index) = snapshot.seats.iter().position(|s| s.user_id == Some(user_id)) {
            self.cache.set_seat_connected(room_id, seat_index as u8, false).await?;
        }
        self.reset_readiness_and_revert(room_id).await?;
        self.cache.bump_version(room_id).await?;
        self.view(room_id).await
    }

    async fn reset_readiness_and_revert(&self, room_id: Uuid) -> Result<(), RoomError> {
        let snapshot = self.cache.get_snapshot(room_id).await?;
        for (i, seat) in snapshot.seats.iter().enumerate() {
            if seat.user_id.is_some() && seat.ready {
                self.cache.set_seat_ready(room_id, i as u8, false).await?;
            }
        }
        if snapshot.meta.status == RoomStatus::ReadyToStart {
            self.cache.set_status(room_id, RoomStatus::Open).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::store::InMemoryStore;

    fn service() -> RoomService {
        RoomService::new(Arc::new(InMemoryStore::new()), Arc::new(InMemoryCache::new()))
    }

    #[tokio::test]
    async fn join_room_is_idempotent_for_an_already_seated_user() {
        // S6: a user who rejoins by code while already seated just flips
        // `connected` and bumps `version` by exactly one.
        let service = service();
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let created = service.create_room(host, Uuid::new_v4(), None, 4, "classic", serde_json::json!({})).await.unwrap();
        let code = created.view.code.clone();

        let joined = service.join_room(guest, &code, None).await.unwrap();
        let seat_index = joined.seats.iter().position(|s| s.user_id == Some(guest)).unwrap();
        let version_after_join = joined.version;

        let rejoined = service.join_room(guest, &code, None).await.unwrap();
        assert_eq!(rejoined.version, version_after_join + 1);
        assert_eq!(rejoined.seats[seat_index].user_id, Some(guest));
        assert!(rejoined.seats[seat_index].connected);
        for (i, seat) in rejoined.seats.iter().enumerate() {
            if i != seat_index && i != 0 {
                assert_eq!(seat.user_id, None);
            }
        }
    }

    #[tokio::test]
    async fn host_leaving_closes_the_room() {
        // S7: host leave on a 2-seat room closes it; the remaining player's
        // view reflects `closed` before cache keys are torn down.
        let service = service();
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let created = service.create_room(host, Uuid::new_v4(), None, 2, "classic", serde_json::json!({})).await.unwrap();
        service.join_room(guest, &created.view.code, None).await.unwrap();

        let (view, reason) = service.leave_room(created.view.room_id, host).await.unwrap();
        assert!(matches!(reason, LeaveReason::HostLeft));
        assert_eq!(view.status, crate::store::RoomStatus::Closed);

        // the room is gone from the cache now — a further read fails.
        assert!(service.view(created.view.room_id).await.is_err());
    }

    #[tokio::test]
    async fn toggle_ready_transitions_to_ready_to_start_once_all_seats_are_ready() {
        let service = service();
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let created = service.create_room(host, Uuid::new_v4(), None, 2, "classic", serde_json::json!({})).await.unwrap();
        service.join_room(guest, &created.view.code, None).await.unwrap();

        service.toggle_ready(created.view.room_id, host).await.unwrap();
        let view = service.toggle_ready(created.view.room_id, guest).await.unwrap();
        assert_eq!(view.status, crate::store::RoomStatus::ReadyToStart);
    }

    #[tokio::test]
    async fn start_game_requires_host_and_all_ready() {
        let service = service();
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let created = service.create_room(host, Uuid::new_v4(), None, 2, "classic", serde_json::json!({})).await.unwrap();
        service.join_room(guest, &created.view.code, None).await.unwrap();
        service.toggle_ready(created.view.room_id, host).await.unwrap();
        service.toggle_ready(created.view.room_id, guest).await.unwrap();

        let err = service.start_game(created.view.room_id, guest).await.unwrap_err();
        assert!(matches!(err, RoomError::NotHost));

        let (view, state) = service.start_game(created.view.room_id, host).await.unwrap();
        assert_eq!(view.status, crate::store::RoomStatus::InGame);
        assert_eq!(state.players.len(), 2);
        assert!(service.game_state(created.view.room_id).is_some());
    }
}
