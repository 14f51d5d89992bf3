use crate::error::ErrorCode;
use crate::protocol::{MessageType, ServerMessage};

use super::context::{HandlerContext, HandlerResult};

pub async fn handle(ctx: HandlerContext) -> HandlerResult {
    let (Some(user_id), Some(room_id)) = (ctx.user_id, ctx.manager.room_of(ctx.connection_id)) else {
        return HandlerResult::err(ServerMessage::error("NOT_IN_ROOM", "not seated in a room"));
    };

    match ctx.rooms.toggle_ready(room_id, user_id).await {
        Ok(view) => {
            let update = ServerMessage::new(MessageType::RoomUpdated, view);
            HandlerResult::ok_with_broadcast(Some(update.clone()), update, room_id)
        }
        Err(e) => HandlerResult::err(ServerMessage::error(e.error_code(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use crate::auth::TokenVerifier;
    use crate::cache::InMemoryCache;
    use crate::connection::ConnectionManager;
    use crate::protocol::{ClientMessage, MessageType as MT};
    use crate::room::RoomService;
    use crate::store::InMemoryStore;

    use super::*;

    #[tokio::test]
    async fn toggle_ready_replies_and_broadcasts_the_same_update() {
        let store: Arc<dyn crate::store::DurableStore> = Arc::new(InMemoryStore::new());
        let cache: Arc<dyn crate::cache::CacheAdapter> = Arc::new(InMemoryCache::new());
        let rooms = Arc::new(RoomService::new(store, cache.clone()));
        let manager = Arc::new(ConnectionManager::new(cache, rooms.clone()));
        let verifier = Arc::new(TokenVerifier::new("https://example.test/.well-known/jwks.json"));

        let host = Uuid::new_v4();
        let created = rooms.create_room(host, Uuid::new_v4(), None, 4, "classic", serde_json::json!({})).await.unwrap();

        let (connection_id, _rx) = manager.register_unauthenticated();
        manager.authenticate(connection_id, host, Some(created.view.room_id)).unwrap();

        let ctx = HandlerContext {
            connection_id,
            user_id: Some(host),
            message: ClientMessage { message_type: MT::ToggleReady, request_id: None, payload: None },
            manager: manager.clone(),
            rooms,
            verifier,
        };

        let result = handle(ctx).await;
        assert!(result.success);
        assert_eq!(result.room_id, Some(created.view.room_id));
        assert!(result.reply.is_some());
        assert_eq!(
            serde_json::to_string(&result.reply.unwrap()).unwrap(),
            serde_json::to_string(&result.broadcast.unwrap()).unwrap()
        );
    }
}
