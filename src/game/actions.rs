use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum GameAction {
    StartGame,
    Roll { value: u8 },
    Move { token_or_stack_id: String },
    CaptureChoice { choice: String },
}

impl GameAction {
    pub fn kind(&self) -> &'static str {
        match self {
            GameAction::StartGame => "start_game",
            GameAction::Roll { .. } => "roll",
            GameAction::Move { .. } => "move",
            GameAction::CaptureChoice { .. } => "capture_choice",
        }
    }
}
