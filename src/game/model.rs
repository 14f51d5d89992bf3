//! Data model for the pure functional game engine (C8).
//!
//! Every type here is plain data: no I/O, no interior mutability, cheap to
//! clone. The engine produces new values rather than mutating these in
//! place, matching the value-replacement contract in the room service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    Hell,
    Road,
    Homestretch,
    Heaven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentEvent {
    PlayerRoll,
    PlayerChoice,
    CaptureChoice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSetup {
    pub squares_to_win: u32,
    pub squares_to_homestretch: u32,
    pub starting_positions: Vec<u32>,
    pub safe_spaces: Vec<u32>,
    pub get_out_rolls: Vec<u8>,
}

impl BoardSetup {
    /// The 4-seat board used throughout the original ruleset's test fixtures
    /// and referenced verbatim by the scenarios in SPEC_FULL.md §8.
    pub fn standard(num_players: usize) -> Self {
        let all_starts = [0u32, 13, 26, 39];
        let all_safe = [0u32, 13, 26, 39, 8, 21, 34, 47];
        BoardSetup {
            squares_to_win: 57,
            squares_to_homestretch: 52,
            starting_positions: all_starts[..num_players.min(4)].to_vec(),
            safe_spaces: all_safe.to_vec(),
            get_out_rolls: vec![6],
        }
    }

    /// Two-seat variant used by several of the ported reference tests.
    pub fn two_player() -> Self {
        BoardSetup {
            squares_to_win: 57,
            squares_to_homestretch: 52,
            starting_positions: vec![0, 26],
            safe_spaces: vec![0, 26],
            get_out_rolls: vec![6],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_id: String,
    pub state: TokenState,
    pub progress: u32,
    pub in_stack: bool,
}

impl Token {
    pub fn new_in_hell(token_id: impl Into<String>) -> Self {
        Token { token_id: token_id.into(), state: TokenState::Hell, progress: 0, in_stack: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub stack_id: String,
    pub token_ids: Vec<String>,
}

impl Stack {
    pub fn height(&self) -> usize {
        self.token_ids.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: Uuid,
    pub name: String,
    pub color: String,
    pub turn_order: u32,
    pub abs_starting_index: u32,
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub stacks: Vec<Stack>,
}

impl Player {
    pub fn token(&self, token_id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.token_id == token_id)
    }

    pub fn token_mut(&mut self, token_id: &str) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.token_id == token_id)
    }

    pub fn stack(&self, stack_id: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.stack_id == stack_id)
    }

    pub fn all_in_heaven(&self) -> bool {
        self.tokens.iter().all(|t| t.state == TokenState::Heaven)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub player_id: Uuid,
    pub initial_roll: bool,
    pub rolls_to_allocate: Vec<u8>,
    pub legal_moves: Vec<String>,
    pub current_turn_order: u32,
    pub extra_rolls: u32,
}

impl Turn {
    pub fn fresh(player_id: Uuid, turn_order: u32) -> Self {
        Turn {
            player_id,
            initial_roll: true,
            rolls_to_allocate: Vec::new(),
            legal_moves: Vec::new(),
            current_turn_order: turn_order,
            extra_rolls: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub players: Vec<Player>,
    pub current_event: CurrentEvent,
    pub board_setup: BoardSetup,
    pub current_turn: Option<Turn>,
    #[serde(default)]
    pub event_seq: u64,
    #[serde(default)]
    pub next_stack_id: u64,
}

impl GameState {
    pub fn player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn player_mut(&mut self, player_id: Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    /// `get_next_turn_order` in the original ruleset: 1-indexed, wraps.
    pub fn next_turn_order(&self, current_order: u32) -> u32 {
        (current_order % self.players.len() as u32) + 1
    }

    pub fn player_by_turn_order(&self, turn_order: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.turn_order == turn_order)
    }
}
