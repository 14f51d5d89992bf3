use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::TokenState;

/// Tagged union of every event the engine can emit. `seq` is always
/// assigned post-hoc by [`super::process::process_action`] — constructors
/// below always start at 0 and get overwritten before the event leaves the
/// engine, matching SPEC_FULL.md §4.8.6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted { seq: u64, player_order: Vec<Uuid>, first_player_id: Uuid },
    DiceRolled { seq: u64, player_id: Uuid, value: u8, roll_number: u32, grants_extra_roll: bool },
    ThreeSixesPenalty { seq: u64, player_id: Uuid, rolls: Vec<u8> },
    TokenMoved {
        seq: u64,
        player_id: Uuid,
        token_id: String,
        from_progress: u32,
        to_progress: u32,
        from_state: TokenState,
        to_state: TokenState,
        roll_used: u8,
    },
    TokenExitedHell { seq: u64, player_id: Uuid, token_id: String, roll_used: u8 },
    TokenReachedHeaven { seq: u64, player_id: Uuid, token_id: String },
    TokenCaptured {
        seq: u64,
        capturing_player_id: Uuid,
        captured_player_id: Uuid,
        token_id: String,
        position: u32,
        grants_extra_roll: bool,
    },
    StackFormed { seq: u64, player_id: Uuid, stack_id: String, token_ids: Vec<String>, progress: u32 },
    StackDissolved { seq: u64, player_id: Uuid, stack_id: String, reason: String },
    StackSplit {
        seq: u64,
        player_id: Uuid,
        stack_id: String,
        moving_token_ids: Vec<String>,
        remaining_token_ids: Vec<String>,
    },
    StackMoved {
        seq: u64,
        player_id: Uuid,
        stack_id: String,
        from_progress: u32,
        to_progress: u32,
        effective_roll: u32,
    },
    TurnStarted { seq: u64, player_id: Uuid, turn_number: u32 },
    TurnEnded { seq: u64, player_id: Uuid, reason: String, next_player_id: Uuid },
    AwaitingChoice { seq: u64, player_id: Uuid, legal_moves: Vec<String>, roll_to_allocate: u8 },
    AwaitingCaptureChoice { seq: u64, player_id: Uuid, options: Vec<String> },
    GameEnded { seq: u64, winner_id: Uuid, final_rankings: Vec<Uuid> },
}

impl GameEvent {
    pub fn seq(&self) -> u64 {
        match self {
            GameEvent::GameStarted { seq, .. }
            | GameEvent::DiceRolled { seq, .. }
            | GameEvent::ThreeSixesPenalty { seq, .. }
            | GameEvent::TokenMoved { seq, .. }
            | GameEvent::TokenExitedHell { seq, .. }
            | GameEvent::TokenReachedHeaven { seq, .. }
            | GameEvent::TokenCaptured { seq, .. }
            | GameEvent::StackFormed { seq, .. }
            | GameEvent::StackDissolved { seq, .. }
            | GameEvent::StackSplit { seq, .. }
            | GameEvent::StackMoved { seq, .. }
            | GameEvent::TurnStarted { seq, .. }
            | GameEvent::TurnEnded { seq, .. }
            | GameEvent::AwaitingChoice { seq, .. }
            | GameEvent::AwaitingCaptureChoice { seq, .. }
            | GameEvent::GameEnded { seq, .. } => *seq,
        }
    }

    pub fn set_seq(&mut self, new_seq: u64) {
        let slot = match self {
            GameEvent::GameStarted { seq, .. }
            | GameEvent::DiceRolled { seq, .. }
            | GameEvent::ThreeSixesPenalty { seq, .. }
            | GameEvent::TokenMoved { seq, .. }
            | GameEvent::TokenExitedHell { seq, .. }
            | GameEvent::TokenReachedHeaven { seq, .. }
            | GameEvent::TokenCaptured { seq, .. }
            | GameEvent::StackFormed { seq, .. }
            | GameEvent::StackDissolved { seq, .. }
            | GameEvent::StackSplit { seq, .. }
            | GameEvent::StackMoved { seq, .. }
            | GameEvent::TurnStarted { seq, .. }
            | GameEvent::TurnEnded { seq, .. }
            | GameEvent::AwaitingChoice { seq, .. }
            | GameEvent::AwaitingCaptureChoice { seq, .. }
            | GameEvent::GameEnded { seq, .. } => seq,
        };
        *slot = new_seq;
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::DiceRolled { .. } => "dice_rolled",
            GameEvent::ThreeSixesPenalty { .. } => "three_sixes_penalty",
            GameEvent::TokenMoved { .. } => "token_moved",
            GameEvent::TokenExitedHell { .. } => "token_exited_hell",
            GameEvent::TokenReachedHeaven { .. } => "token_reached_heaven",
            GameEvent::TokenCaptured { .. } => "token_captured",
            GameEvent::StackFormed { .. } => "stack_formed",
            GameEvent::StackDissolved { .. } => "stack_dissolved",
            GameEvent::StackSplit { .. } => "stack_split",
            GameEvent::StackMoved { .. } => "stack_moved",
            GameEvent::TurnStarted { .. } => "turn_started",
            GameEvent::TurnEnded { .. } => "turn_ended",
            GameEvent::AwaitingChoice { .. } => "awaiting_choice",
            GameEvent::AwaitingCaptureChoice { .. } => "awaiting_capture_choice",
            GameEvent::GameEnded { .. } => "game_ended",
        }
    }
}
