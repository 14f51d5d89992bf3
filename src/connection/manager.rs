//! Connection manager (C5), grounded on the original ruleset's
//! `ConnectionManager`: local indices mirrored by a distributed presence
//! counter in the cache. A single mutex guards the three index maps per
//! SPEC_FULL.md §5 so any one public method is atomic with respect to them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::CacheAdapter;
use crate::error::ProtocolError;
use crate::protocol::{MessageType, ServerMessage};
use crate::room::RoomService;

use super::model::{Connection, Outbound};

#[derive(Default)]
struct Indices {
    connections: HashMap<Uuid, Connection>,
    user_conns: HashMap<Uuid, HashSet<Uuid>>,
    room_conns: HashMap<Uuid, HashSet<Uuid>>,
}

pub struct ConnectionManager {
    indices: Mutex<Indices>,
    cache: Arc<dyn CacheAdapter>,
    rooms: Arc<RoomService>,
}

impl ConnectionManager {
    pub fn new(cache: Arc<dyn CacheAdapter>, rooms: Arc<RoomService>) -> Self {
        Self { indices: Mutex::new(Indices::default()), cache, rooms }
    }

    /// Allocates a connection_id and wires up the server->client channel;
    /// returns the id plus the receiver half for the caller's forwarding
    /// task (the accepted socket itself is owned by C9, never by C5).
    pub fn register_unauthenticated(&self) -> (Uuid, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();
        let connection = Connection::new(connection_id, tx);
        self.indices.lock().connections.insert(connection_id, connection);
        info!(%connection_id, "connection registered");
        (connection_id, rx)
    }

    pub fn authenticate(&self, connection_id: Uuid, user_id: Uuid, room_id: Option<Uuid>) -> Result<(), ProtocolError> {
        let mut indices = self.indices.lock();
        let Some(connection) = indices.connections.get_mut(&connection_id) else {
            return Err(ProtocolError::InvalidMessage);
        };
        if connection.authenticated {
            return Err(ProtocolError::AlreadyAuthenticated);
        }
        connection.authenticated = true;
        connection.user_id = Some(user_id);
        connection.room_id = room_id;

        indices.user_conns.entry(user_id).or_default().insert(connection_id);
        if let Some(room_id) = room_id {
            indices.room_conns.entry(room_id).or_default().insert(connection_id);
        }
        info!(%connection_id, %user_id, ?room_id, "connection authenticated");
        Ok(())
    }

    pub fn heartbeat(&self, connection_id: Uuid) {
        if let Some(connection) = self.indices.lock().connections.get_mut(&connection_id) {
            connection.last_heartbeat = Instant::now();
        }
    }

    /// Sends a close directive then runs the normal disconnect teardown;
    /// used by the reaper and by shutdown.
    pub async fn evict(&self, connection_id: Uuid, code: u16) {
        self.send_outbound(connection_id, Outbound::Close(code));
        self.disconnect(connection_id).await;
    }

    fn send_outbound(&self, connection_id: Uuid, outbound: Outbound) -> bool {
        let indices = self.indices.lock();
        let Some(connection) = indices.connections.get(&connection_id) else { return false };
        connection.tx.send(outbound).is_ok()
    }

    pub async fn disconnect(&self, connection_id: Uuid) {
        let removed = {
            let mut indices = self.indices.lock();
            let Some(connection) = indices.connections.remove(&connection_id) else { return };
            if let Some(user_id) = connection.user_id {
                if let Some(set) = indices.user_conns.get_mut(&user_id) {
                    set.remove(&connection_id);
                    if set.is_empty() {
                        indices.user_conns.remove(&user_id);
                    }
                }
            }
            if let Some(room_id) = connection.room_id {
                if let Some(set) = indices.room_conns.get_mut(&room_id) {
                    set.remove(&connection_id);
                    if set.is_empty() {
                        indices.room_conns.remove(&room_id);
                    }
                }
            }
            connection
        };

        if let Some(user_id) = removed.user_id {
            self.cache.conn_count_decr(user_id).await;

            if let Some(room_id) = removed.room_id {
                match self.rooms.disconnect_cleanup(room_id, user_id).await {
                    Ok(view) => {
                        self.send_to_room(room_id, ServerMessage::new(MessageType::RoomUpdated, view), None);
                    }
                    Err(e) => warn!(%room_id, %user_id, error = %e, "disconnect cleanup failed"),
                }
            }
        }
        info!(%connection_id, "connection disconnected");
    }

    pub fn send_to_connection(&self, connection_id: Uuid, message: ServerMessage) -> bool {
        self.send_outbound(connection_id, Outbound::Message(message))
    }

    pub fn send_to_user(&self, user_id: Uuid, message: ServerMessage) -> usize {
        let indices = self.indices.lock();
        let Some(conn_ids) = indices.user_conns.get(&user_id) else { return 0 };
        conn_ids
            .iter()
            .filter_map(|id| indices.connections.get(id))
            .filter(|c| c.tx.send(Outbound::Message(message.clone())).is_ok())
            .count()
    }

    pub fn send_to_room(&self, room_id: Uuid, message: ServerMessage, exclude: Option<Uuid>) -> usize {
        let indices = self.indices.lock();
        let Some(conn_ids) = indices.room_conns.get(&room_id) else { return 0 };
        conn_ids
            .iter()
            .filter(|id| Some(**id) != exclude)
            .filter_map(|id| indices.connections.get(id))
            .filter(|c| c.tx.send(Outbound::Message(message.clone())).is_ok())
            .count()
    }

    pub fn stale_connections(&self, timeout: std::time::Duration) -> Vec<Uuid> {
        let now = Instant::now();
        self.indices
            .lock()
            .connections
            .values()
            .filter(|c| now.duration_since(c.last_heartbeat) > timeout)
            .map(|c| c.connection_id)
            .collect()
    }

    pub async fn close_all(&self) {
        let ids: Vec<Uuid> = self.indices.lock().connections.keys().copied().collect();
        debug!(count = ids.len(), "closing all connections");
        for id in ids {
            self.evict(id, 1001).await;
        }
    }

    pub fn room_of(&self, connection_id: Uuid) -> Option<Uuid> {
        self.indices.lock().connections.get(&connection_id).and_then(|c| c.room_id)
    }

    pub fn user_of(&self, connection_id: Uuid) -> Option<Uuid> {
        self.indices.lock().connections.get(&connection_id).and_then(|c| c.user_id)
    }

    pub fn join_connection_to_room(&self, connection_id: Uuid, room_id: Uuid) {
        let mut indices = self.indices.lock();
        if let Some(connection) = indices.connections.get_mut(&connection_id) {
            connection.room_id = Some(room_id);
        }
        indices.room_conns.entry(room_id).or_default().insert(connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::store::InMemoryStore;

    fn manager() -> ConnectionManager {
        let store: Arc<dyn crate::store::DurableStore> = Arc::new(InMemoryStore::new());
        let cache: Arc<dyn CacheAdapter> = Arc::new(InMemoryCache::new());
        let rooms = Arc::new(RoomService::new(store, cache.clone()));
        ConnectionManager::new(cache, rooms)
    }

    #[test]
    fn authenticate_wires_user_and_room_indices() {
        let manager = manager();
        let (connection_id, _rx) = manager.register_unauthenticated();
        let user_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();

        manager.authenticate(connection_id, user_id, Some(room_id)).unwrap();

        assert_eq!(manager.user_of(connection_id), Some(user_id));
        assert_eq!(manager.room_of(connection_id), Some(room_id));
        assert_eq!(manager.send_to_room(room_id, ServerMessage::error("X", "y"), None), 1);
    }

    #[test]
    fn duplicate_authenticate_is_a_protocol_error() {
        let manager = manager();
        let (connection_id, _rx) = manager.register_unauthenticated();
        let user_id = Uuid::new_v4();
        manager.authenticate(connection_id, user_id, None).unwrap();

        let err = manager.authenticate(connection_id, user_id, None).unwrap_err();
        assert!(matches!(err, ProtocolError::AlreadyAuthenticated));
    }

    #[test]
    fn send_to_room_excludes_the_requester() {
        let manager = manager();
        let room_id = Uuid::new_v4();
        let (requester, mut requester_rx) = manager.register_unauthenticated();
        manager.authenticate(requester, Uuid::new_v4(), Some(room_id)).unwrap();
        let (other, mut other_rx) = manager.register_unauthenticated();
        manager.authenticate(other, Uuid::new_v4(), Some(room_id)).unwrap();

        let sent = manager.send_to_room(room_id, ServerMessage::error("X", "y"), Some(requester));
        assert_eq!(sent, 1);
        assert!(requester_rx.try_recv().is_err());
        assert!(other_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn disconnect_removes_all_indices() {
        let manager = manager();
        let (connection_id, _rx) = manager.register_unauthenticated();
        let user_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();
        manager.authenticate(connection_id, user_id, Some(room_id)).unwrap();

        manager.disconnect(connection_id).await;

        assert_eq!(manager.user_of(connection_id), None);
        assert_eq!(manager.room_of(connection_id), None);
        assert_eq!(manager.send_to_room(room_id, ServerMessage::error("X", "y"), None), 0);
    }
}
