//! Crate-wide error taxonomy (A3). Each layer gets its own `thiserror` enum;
//! every variant maps onto one of the stable wire codes in SPEC_FULL.md §7
//! through `error_code`. `main` and other startup-only paths use
//! `anyhow::Result` instead — see `main.rs`.

use thiserror::Error;

pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token supplied")]
    MissingToken,
    #[error("token is malformed")]
    Malformed,
    #[error("token uses a disallowed algorithm")]
    AlgorithmNotAllowed,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("jwks fetch failed: {0}")]
    JwksUnavailable(String),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::Malformed | AuthError::AlgorithmNotAllowed | AuthError::SignatureInvalid => "AUTH_FAILED",
            AuthError::Expired => "AUTH_EXPIRED",
            AuthError::JwksUnavailable(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is closed")]
    RoomClosed,
    #[error("room is in game")]
    RoomInGame,
    #[error("room is full")]
    RoomFull,
    #[error("room code generation collided too many times")]
    CodeCollision,
    #[error("seat already occupied")]
    SeatTaken,
    #[error("internal store failure: {0}")]
    Internal(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            StoreError::RoomNotFound => "ROOM_NOT_FOUND",
            StoreError::RoomClosed => "ROOM_CLOSED",
            StoreError::RoomInGame => "ROOM_IN_GAME",
            StoreError::RoomFull => "ROOM_FULL",
            StoreError::CodeCollision | StoreError::SeatTaken | StoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("room cache state missing")]
    NotFound,
    #[error("cache script rejected, fell back to non-atomic path")]
    ScriptDegraded,
    #[error("internal cache failure: {0}")]
    Internal(String),
}

impl ErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        match self {
            CacheError::NotFound => "ROOM_NOT_FOUND",
            CacheError::ScriptDegraded | CacheError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("room access denied")]
    AccessDenied,
    #[error("caller is not seated in this room")]
    NotSeated,
    #[error("caller is not the host")]
    NotHost,
    #[error("caller is not currently in a room")]
    NotInRoom,
    #[error("not every seat is ready")]
    PlayersNotReady,
    #[error("operation invalid in the room's current state")]
    InvalidRoomState,
}

impl ErrorCode for RoomError {
    fn error_code(&self) -> &'static str {
        match self {
            RoomError::Store(e) => e.error_code(),
            RoomError::Cache(e) => e.error_code(),
            RoomError::AccessDenied => "ROOM_ACCESS_DENIED",
            RoomError::NotSeated => "NOT_SEATED",
            RoomError::NotHost => "NOT_HOST",
            RoomError::NotInRoom => "NOT_IN_ROOM",
            RoomError::PlayersNotReady => "PLAYERS_NOT_READY",
            RoomError::InvalidRoomState => "INVALID_ROOM_STATE",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame exceeds the maximum message size")]
    MessageTooLarge,
    #[error("connection exceeded its rate limit")]
    RateLimited,
    #[error("frame is not valid JSON")]
    InvalidJson,
    #[error("frame does not match a known envelope shape")]
    InvalidMessage,
    #[error("payload failed schema validation: {0}")]
    Validation(String),
    #[error("connection already authenticated")]
    AlreadyAuthenticated,
}

impl ErrorCode for ProtocolError {
    fn error_code(&self) -> &'static str {
        match self {
            ProtocolError::MessageTooLarge => "MESSAGE_TOO_LARGE",
            ProtocolError::RateLimited => "RATE_LIMITED",
            ProtocolError::InvalidJson => "INVALID_JSON",
            ProtocolError::InvalidMessage => "INVALID_MESSAGE",
            ProtocolError::Validation(_) => "VALIDATION_ERROR",
            ProtocolError::AlreadyAuthenticated => "ALREADY_AUTHENTICATED",
        }
    }
}

/// Thin wrapper so handlers can return a `game::ValidationError`/engine
/// failure alongside the rest of the taxonomy without re-deriving one.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GameError {
    pub code: &'static str,
    pub message: String,
}

impl ErrorCode for GameError {
    fn error_code(&self) -> &'static str {
        self.code
    }
}
