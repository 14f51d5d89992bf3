//! Structured logging (A2): one `tracing` subscriber for the process,
//! configured from `RUST_LOG`. Mirrors the teacher's `main.rs` setup,
//! generalized to give every layer (connection/room/protocol/game) a
//! sensible default when the env var is unset.

pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info,ludo_core=debug".into()),
        )
        .init();
}
