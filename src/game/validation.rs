use uuid::Uuid;

use super::actions::GameAction;
use super::model::{CurrentEvent, GamePhase, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    const fn new(code: &'static str, message: &'static str) -> Self {
        ValidationError { code, message }
    }
}

/// Implements the fixed rejection order from SPEC_FULL.md §4.8.2: each
/// check short-circuits the next, so callers get exactly one reason for a
/// rejected action.
pub fn validate_action(state: &GameState, action: &GameAction, actor_id: Uuid) -> Result<(), ValidationError> {
    if matches!(action, GameAction::StartGame) {
        return if state.phase == GamePhase::NotStarted {
            Ok(())
        } else {
            Err(ValidationError::new("GAME_ALREADY_STARTED", "game has already started"))
        };
    }

    match state.phase {
        GamePhase::NotStarted => return Err(ValidationError::new("GAME_NOT_STARTED", "game has not started")),
        GamePhase::Finished => return Err(ValidationError::new("GAME_FINISHED", "game has already finished")),
        GamePhase::InProgress => {}
    }

    let turn = state
        .current_turn
        .as_ref()
        .ok_or(ValidationError::new("NO_ACTIVE_TURN", "no active turn"))?;

    if turn.player_id != actor_id {
        return Err(ValidationError::new("NOT_YOUR_TURN", "it is not your turn"));
    }

    match action {
        GameAction::StartGame => unreachable!("handled above"),
        GameAction::Roll { .. } => {
            if state.current_event != CurrentEvent::PlayerRoll {
                return Err(ValidationError::new("INVALID_ACTION", "a roll is not expected right now"));
            }
        }
        GameAction::Move { token_or_stack_id } => {
            if state.current_event != CurrentEvent::PlayerChoice {
                return Err(ValidationError::new("INVALID_ACTION", "a move is not expected right now"));
            }
            if !turn.legal_moves.iter().any(|m| m == token_or_stack_id) {
                return Err(ValidationError::new("ILLEGAL_MOVE", "that token or stack cannot move"));
            }
        }
        GameAction::CaptureChoice { .. } => {
            if state.current_event != CurrentEvent::CaptureChoice {
                return Err(ValidationError::new("INVALID_ACTION", "no capture choice is pending"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::model::{BoardSetup, Player, Token, Turn};

    fn minimal_state(phase: GamePhase, event: CurrentEvent, turn_player: Uuid) -> GameState {
        GameState {
            phase,
            players: vec![Player {
                player_id: turn_player,
                name: "P1".into(),
                color: "red".into(),
                turn_order: 1,
                abs_starting_index: 0,
                tokens: vec![Token::new_in_hell("t1")],
                stacks: vec![],
            }],
            current_event: event,
            board_setup: BoardSetup::two_player(),
            current_turn: Some(Turn::fresh(turn_player, 1)),
            event_seq: 0,
            next_stack_id: 0,
        }
    }

    #[test]
    fn rejects_start_game_when_already_started() {
        let p = Uuid::new_v4();
        let state = minimal_state(GamePhase::InProgress, CurrentEvent::PlayerRoll, p);
        let err = validate_action(&state, &GameAction::StartGame, p).unwrap_err();
        assert_eq!(err.code, "GAME_ALREADY_STARTED");
    }

    #[test]
    fn rejects_wrong_player_turn() {
        let p = Uuid::new_v4();
        let other = Uuid::new_v4();
        let state = minimal_state(GamePhase::InProgress, CurrentEvent::PlayerRoll, p);
        let err = validate_action(&state, &GameAction::Roll { value: 3 }, other).unwrap_err();
        assert_eq!(err.code, "NOT_YOUR_TURN");
    }

    #[test]
    fn rejects_illegal_move() {
        let p = Uuid::new_v4();
        let mut state = minimal_state(GamePhase::InProgress, CurrentEvent::PlayerChoice, p);
        state.current_turn.as_mut().unwrap().legal_moves = vec!["t_other".into()];
        let err = validate_action(&state, &GameAction::Move { token_or_stack_id: "t1".into() }, p).unwrap_err();
        assert_eq!(err.code, "ILLEGAL_MOVE");
    }
}
