use super::events::GameEvent;
use super::model::GameState;

/// Result of a single `process_action` call. Mirrors SPEC_FULL.md §4.8:
/// always structured, the engine never panics or returns an `Err` for a
/// rule violation — only `success=false` with a stable `error_code`.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub success: bool,
    pub state: Option<GameState>,
    pub events: Vec<GameEvent>,
    pub error_code: Option<&'static str>,
    pub error_message: Option<String>,
}

impl ProcessResult {
    pub fn ok(state: GameState, events: Vec<GameEvent>) -> Self {
        ProcessResult { success: true, state: Some(state), events, error_code: None, error_message: None }
    }

    pub fn failure(error_code: &'static str, error_message: impl Into<String>) -> Self {
        ProcessResult {
            success: false,
            state: None,
            events: Vec::new(),
            error_code: Some(error_code),
            error_message: Some(error_message.into()),
        }
    }
}

/// Intermediate result from the collision-resolution step: a state plus
/// the events it produced, with a flag for the (currently stubbed) choice
/// hook described in SPEC_FULL.md §9.
#[derive(Debug, Clone)]
pub struct CollisionResult {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub requires_choice: bool,
}

impl CollisionResult {
    pub fn unchanged(state: GameState) -> Self {
        CollisionResult { state, events: Vec::new(), requires_choice: false }
    }
}
