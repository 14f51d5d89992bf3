//! Stale-connection reaper (C5 §4.5): runs on a ticker, closes any
//! connection whose heartbeat has gone quiet past `connection_timeout`.
//! Grounded on the original ruleset's `cleanup_loop` task, adapted to
//! `tokio::select!` so it cancels cleanly on shutdown instead of relying on
//! `CancelledError`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use super::manager::ConnectionManager;

pub async fn run(manager: Arc<ConnectionManager>, heartbeat_interval: Duration, connection_timeout: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(heartbeat_interval);
    info!(?heartbeat_interval, ?connection_timeout, "reaper started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let stale = manager.stale_connections(connection_timeout);
                if !stale.is_empty() {
                    warn!(count = stale.len(), "reaping stale connections");
                }
                for connection_id in stale {
                    manager.evict(connection_id, 1001).await;
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("reaper cancelled");
                    break;
                }
            }
        }
    }
}
