//! Pure functional game engine (C8): board state, action validation, and
//! event generation for the Ludo-variant ruleset. Every function here is a
//! total function of its inputs — no I/O, no clocks, no randomness. Callers
//! (the room service) own persistence and broadcast.

mod actions;
mod collisions;
mod events;
mod legal_moves;
mod model;
mod movement;
mod process;
mod result;
mod rolling;
mod start;
mod validation;

pub use actions::GameAction;
pub use events::GameEvent;
pub use legal_moves::{get_legal_moves, has_any_legal_moves};
pub use model::{BoardSetup, CurrentEvent, GamePhase, GameState, Player, Stack, Token, TokenState, Turn};
pub use process::{check_win_condition, process_action};
pub use result::{CollisionResult, ProcessResult};
pub use start::{initialize_game, validate_game_settings, GameSettings, PlayerAttributes, SettingsError};
pub use validation::{validate_action, ValidationError};
