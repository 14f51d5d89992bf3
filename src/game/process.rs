use tracing::{debug, info, warn};
use uuid::Uuid;

use super::actions::GameAction;
use super::events::GameEvent;
use super::model::{CurrentEvent, GamePhase, GameState, TokenState};
use super::movement::process_move;
use super::result::ProcessResult;
use super::rolling::{create_new_turn, process_roll};
use super::validation::validate_action;

/// Main entry point for all game actions (SPEC_FULL.md §4.8). Validates,
/// dispatches to the matching handler, then assigns sequence numbers to the
/// events the handler produced.
pub fn process_action(state: &GameState, action: &GameAction, player_id: Uuid) -> ProcessResult {
    info!(player = %player_id, action = action.kind(), phase = ?state.phase, "processing action");

    if let Err(err) = validate_action(state, action, player_id) {
        warn!(player = %player_id, code = err.code, "action rejected");
        return ProcessResult::failure(err.code, err.message);
    }

    let result = match action {
        GameAction::StartGame => process_start_game(state),
        GameAction::Roll { value } => process_roll(state, *value, player_id),
        GameAction::Move { token_or_stack_id } => process_move(state, token_or_stack_id, player_id),
        GameAction::CaptureChoice { choice } => process_capture_choice(state, choice, player_id),
    };

    if result.success {
        let with_seq = assign_event_sequences(result);
        debug!(events = with_seq.events.len(), "action processed");
        with_seq
    } else {
        result
    }
}

fn assign_event_sequences(mut result: ProcessResult) -> ProcessResult {
    let Some(state) = result.state.as_mut() else { return result };
    if result.events.is_empty() {
        return result;
    }

    let mut seq = state.event_seq;
    for event in &mut result.events {
        event.set_seq(seq);
        seq += 1;
    }
    state.event_seq = seq;
    result
}

/// Transitions `NotStarted` -> `InProgress` and creates the first turn.
/// Turn order is assigned at seat time (see DESIGN.md); no shuffling here.
pub fn process_start_game(state: &GameState) -> ProcessResult {
    info!(players = state.players.len(), "starting game");
    let mut events = Vec::new();

    let new_turn = create_new_turn(1, state);

    let mut player_order: Vec<_> = state.players.iter().collect();
    player_order.sort_by_key(|p| p.turn_order);
    let player_order: Vec<Uuid> = player_order.iter().map(|p| p.player_id).collect();
    let first_player_id = state
        .player_by_turn_order(1)
        .map(|p| p.player_id)
        .unwrap_or_else(|| player_order[0]);

    events.push(GameEvent::GameStarted { seq: 0, player_order, first_player_id });
    events.push(GameEvent::TurnStarted { seq: 0, player_id: first_player_id, turn_number: 1 });

    let mut new_state = state.clone();
    new_state.phase = GamePhase::InProgress;
    new_state.current_event = CurrentEvent::PlayerRoll;
    new_state.current_turn = Some(new_turn);

    ProcessResult::ok(new_state, events)
}

/// Placeholder hook for the (currently unused) multi-target capture choice
/// flow — see SPEC_FULL.md §9. No scenario in this ruleset produces more
/// than one capture target, so this is a no-op that echoes the state back.
fn process_capture_choice(state: &GameState, _choice: &str, _player_id: Uuid) -> ProcessResult {
    ProcessResult::ok(state.clone(), Vec::new())
}

/// A player wins once every one of their tokens has reached HEAVEN.
pub fn check_win_condition(state: &GameState) -> Option<Uuid> {
    state
        .players
        .iter()
        .find(|p| p.tokens.iter().all(|t| t.state == TokenState::Heaven))
        .map(|p| p.player_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::start::{initialize_game, GameSettings, PlayerAttributes};

    fn two_player_settings() -> GameSettings {
        GameSettings {
            num_players: 2,
            player_attributes: vec![
                PlayerAttributes { player_id: Uuid::new_v4(), name: "P1".into(), color: "red".into() },
                PlayerAttributes { player_id: Uuid::new_v4(), name: "P2".into(), color: "blue".into() },
            ],
        }
    }

    #[test]
    fn start_game_transitions_phase_and_creates_first_turn() {
        let settings = two_player_settings();
        let state = initialize_game(&settings).unwrap();
        let result = process_action(&state, &GameAction::StartGame, settings.player_attributes[0].player_id);
        assert!(result.success);
        let new_state = result.state.unwrap();
        assert_eq!(new_state.phase, GamePhase::InProgress);
        assert_eq!(new_state.current_turn.as_ref().unwrap().player_id, settings.player_attributes[0].player_id);
        assert!(result.events.iter().any(|e| e.event_type() == "game_started"));
        assert_eq!(result.events[0].seq(), 0);
        assert_eq!(result.events[1].seq(), 1);
    }

    #[test]
    fn rejects_start_game_from_wrong_actor_is_still_allowed() {
        // start_game has no actor restriction beyond phase == NotStarted.
        let settings = two_player_settings();
        let state = initialize_game(&settings).unwrap();
        let result = process_action(&state, &GameAction::StartGame, Uuid::new_v4());
        assert!(result.success);
    }
}
