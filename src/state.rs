//! Shared application state handed to every axum handler (WS and HTTP
//! alike) as `State<AppState>`. Thin by design: each field is one of the
//! adapters/services built in `src/{auth,store,cache,room,connection}`.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::connection::ConnectionManager;
use crate::room::RoomService;
use crate::store::DurableStore;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ConnectionManager>,
    pub rooms: Arc<RoomService>,
    pub verifier: Arc<TokenVerifier>,
    pub store: Arc<dyn DurableStore>,
}
