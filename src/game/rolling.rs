use tracing::{debug, info};

use super::events::GameEvent;
use super::legal_moves::get_legal_moves;
use super::model::{CurrentEvent, GameState, Turn};
use super::result::ProcessResult;

pub fn create_new_turn(turn_order: u32, state: &GameState) -> Turn {
    let player = state
        .player_by_turn_order(turn_order)
        .expect("turn_order must reference a seated player");
    Turn::fresh(player.player_id, turn_order)
}

/// Handles `GameAction::Roll` (SPEC_FULL.md §4.8.5). Three consecutive
/// sixes end the turn immediately; a bare six grants another roll; anything
/// else either opens a player choice or ends the turn when nothing can move.
/// No `RollGranted` event is emitted — see DESIGN.md.
pub fn process_roll(state: &GameState, roll_value: u8, player_id: uuid::Uuid) -> ProcessResult {
    let Some(current_turn) = state.current_turn.clone() else {
        return ProcessResult::failure("NO_ACTIVE_TURN", "no active turn");
    };

    let mut events = Vec::new();
    let mut new_rolls = current_turn.rolls_to_allocate.clone();
    new_rolls.push(roll_value);
    let roll_number = new_rolls.len() as u32;

    debug!(player = %player_id, roll_value, roll_number, "recording roll");

    if new_rolls.len() >= 3 && new_rolls[new_rolls.len() - 3..].iter().all(|&r| r == 6) {
        info!(player = %player_id, "three sixes penalty");
        events.push(GameEvent::ThreeSixesPenalty {
            seq: 0,
            player_id,
            rolls: new_rolls[new_rolls.len() - 3..].to_vec(),
        });

        let next_turn_order = state.next_turn_order(current_turn.current_turn_order);
        let next_player = state
            .player_by_turn_order(next_turn_order)
            .expect("next_turn_order must resolve to a seated player");
        let next_player_id = next_player.player_id;

        events.push(GameEvent::TurnEnded { seq: 0, player_id, reason: "three_sixes".into(), next_player_id });
        events.push(GameEvent::TurnStarted { seq: 0, player_id: next_player_id, turn_number: next_turn_order });

        let mut new_state = state.clone();
        new_state.current_event = CurrentEvent::PlayerRoll;
        new_state.current_turn = Some(create_new_turn(next_turn_order, state));
        return ProcessResult::ok(new_state, events);
    }

    let grants_extra = roll_value == 6;
    events.push(GameEvent::DiceRolled { seq: 0, player_id, value: roll_value, roll_number, grants_extra_roll: grants_extra });

    let mut updated_turn = current_turn.clone();
    updated_turn.rolls_to_allocate = new_rolls.clone();
    updated_turn.initial_roll = false;

    if roll_value == 6 {
        info!(player = %player_id, "rolled a six, extra roll granted");
        let mut new_state = state.clone();
        new_state.current_event = CurrentEvent::PlayerRoll;
        new_state.current_turn = Some(updated_turn);
        return ProcessResult::ok(new_state, events);
    }

    let current_player = state
        .player(current_turn.player_id)
        .expect("current_turn.player_id must reference a seated player");
    let legal_moves = get_legal_moves(current_player, new_rolls[0], &state.board_setup);

    if !legal_moves.is_empty() {
        updated_turn.legal_moves = legal_moves.clone();
        events.push(GameEvent::AwaitingChoice { seq: 0, player_id, legal_moves, roll_to_allocate: new_rolls[0] });
        let mut new_state = state.clone();
        new_state.current_event = CurrentEvent::PlayerChoice;
        new_state.current_turn = Some(updated_turn);
        return ProcessResult::ok(new_state, events);
    }

    info!(player = %player_id, roll = new_rolls[0], "no legal moves, ending turn");
    let next_turn_order = state.next_turn_order(current_turn.current_turn_order);
    let next_player = state
        .player_by_turn_order(next_turn_order)
        .expect("next_turn_order must resolve to a seated player");
    let next_player_id = next_player.player_id;

    events.push(GameEvent::TurnEnded { seq: 0, player_id, reason: "no_legal_moves".into(), next_player_id });
    events.push(GameEvent::TurnStarted { seq: 0, player_id: next_player_id, turn_number: next_turn_order });

    let mut new_state = state.clone();
    new_state.current_event = CurrentEvent::PlayerRoll;
    new_state.current_turn = Some(create_new_turn(next_turn_order, state));
    ProcessResult::ok(new_state, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::model::{BoardSetup, GamePhase, Player, Token};
    use uuid::Uuid;

    fn two_player_state(p1: Uuid, p2: Uuid) -> GameState {
        GameState {
            phase: GamePhase::InProgress,
            players: vec![
                Player {
                    player_id: p1,
                    name: "P1".into(),
                    color: "red".into(),
                    turn_order: 1,
                    abs_starting_index: 0,
                    tokens: vec![Token::new_in_hell("t1")],
                    stacks: vec![],
                },
                Player {
                    player_id: p2,
                    name: "P2".into(),
                    color: "blue".into(),
                    turn_order: 2,
                    abs_starting_index: 26,
                    tokens: vec![Token::new_in_hell("t2")],
                    stacks: vec![],
                },
            ],
            current_event: CurrentEvent::PlayerRoll,
            board_setup: BoardSetup::two_player(),
            current_turn: Some(Turn::fresh(p1, 1)),
            event_seq: 0,
            next_stack_id: 0,
        }
    }

    #[test]
    fn three_sixes_in_a_row_ends_turn() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let mut state = two_player_state(p1, p2);
        state.current_turn.as_mut().unwrap().rolls_to_allocate = vec![6, 6];
        let result = process_roll(&state, 6, p1);
        assert!(result.success);
        let new_state = result.state.unwrap();
        assert_eq!(new_state.current_turn.as_ref().unwrap().player_id, p2);
        assert!(result.events.iter().any(|e| e.event_type() == "three_sixes_penalty"));
        assert!(result.events.iter().any(|e| e.event_type() == "turn_ended"));
    }

    #[test]
    fn rolling_six_grants_another_roll_same_player() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let state = two_player_state(p1, p2);
        let result = process_roll(&state, 6, p1);
        assert!(result.success);
        let new_state = result.state.unwrap();
        assert_eq!(new_state.current_event, CurrentEvent::PlayerRoll);
        assert_eq!(new_state.current_turn.as_ref().unwrap().player_id, p1);
    }

    #[test]
    fn no_legal_moves_ends_turn_and_advances() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let state = two_player_state(p1, p2);
        let result = process_roll(&state, 3, p1);
        assert!(result.success);
        let new_state = result.state.unwrap();
        assert_eq!(new_state.current_turn.as_ref().unwrap().player_id, p2);
        assert!(result.events.iter().any(|e| e.event_type() == "turn_ended"));
    }

    #[test]
    fn legal_move_opens_player_choice() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let state = two_player_state(p1, p2);
        let result = process_roll(&state, 6, p1);
        let new_state = result.state.unwrap();
        let result2 = process_roll(&new_state, 4, p1);
        assert!(result2.success);
        let final_state = result2.state.unwrap();
        assert_eq!(final_state.current_event, CurrentEvent::PlayerChoice);
    }
}
