use tracing::info;
use uuid::Uuid;

use super::collisions::{resolve_collisions_after_move, MovedPiece};
use super::events::GameEvent;
use super::legal_moves::get_legal_moves;
use super::model::{CurrentEvent, GamePhase, GameState, TokenState};
use super::process::check_win_condition;
use super::result::ProcessResult;

enum Target {
    Token(String),
    FullStack(String),
    PartialStack(String, usize),
}

fn parse_target(token_or_stack_id: &str, player: &super::model::Player) -> Target {
    if let Some((stack_id, count)) = token_or_stack_id.split_once(':') {
        if let Ok(k) = count.parse::<usize>() {
            return Target::PartialStack(stack_id.to_string(), k);
        }
    }
    if player.stack(token_or_stack_id).is_some() {
        Target::FullStack(token_or_stack_id.to_string())
    } else {
        Target::Token(token_or_stack_id.to_string())
    }
}

fn next_state(to_progress: u32, board: &super::model::BoardSetup) -> TokenState {
    if to_progress >= board.squares_to_win {
        TokenState::Heaven
    } else if to_progress >= board.squares_to_homestretch {
        TokenState::Homestretch
    } else {
        TokenState::Road
    }
}

/// Handles `GameAction::Move` (SPEC_FULL.md §4.8.5). Dispatches to a single
/// token, a full stack, or a partial stack split, resolves any collision at
/// the landing square, then decides whether the turn continues (queued
/// rolls, extra rolls from a capture) or passes to the next player.
pub fn process_move(state: &GameState, token_or_stack_id: &str, player_id: Uuid) -> ProcessResult {
    let Some(turn) = state.current_turn.clone() else {
        return ProcessResult::failure("NO_ACTIVE_TURN", "no active turn");
    };
    let Some(roll) = turn.rolls_to_allocate.first().copied() else {
        return ProcessResult::failure("NO_ROLL_TO_ALLOCATE", "no roll available to allocate");
    };
    let Some(player) = state.player(player_id) else {
        return ProcessResult::failure("UNKNOWN_PLAYER", "player not found");
    };

    let target = parse_target(token_or_stack_id, player);
    let (mut new_state, mut events, moved) = match target {
        Target::Token(token_id) => apply_token_move(state, player_id, &token_id, roll),
        Target::FullStack(stack_id) => apply_stack_move(state, player_id, &stack_id, roll),
        Target::PartialStack(stack_id, k) => apply_partial_split(state, player_id, &stack_id, k, roll),
    };

    if let Some(moved) = moved {
        let collision = resolve_collisions_after_move(&new_state, &moved, player_id);
        new_state = collision.state;
        events.extend(collision.events);
    }

    if let Some(winner_id) = check_win_condition(&new_state) {
        new_state.phase = GamePhase::Finished;
        let mut final_rankings = vec![winner_id];
        let mut others: Vec<Uuid> = new_state
            .players
            .iter()
            .filter(|p| p.player_id != winner_id)
            .map(|p| p.player_id)
            .collect();
        others.sort_by_key(|id| new_state.player(*id).map(|p| p.turn_order).unwrap_or(u32::MAX));
        final_rankings.extend(others);
        info!(%winner_id, "game finished");
        events.push(GameEvent::GameEnded { seq: 0, winner_id, final_rankings });
        new_state.current_turn = None;
        return ProcessResult::ok(new_state, events);
    }

    finish_turn(new_state, events, player_id, roll)
}

fn apply_token_move(state: &GameState, player_id: Uuid, token_id: &str, roll: u8) -> (GameState, Vec<GameEvent>, Option<MovedPiece>) {
    let mut new_state = state.clone();
    let player = new_state.player_mut(player_id).expect("player must exist");
    let token = player.token_mut(token_id).expect("move target must exist on player");

    let mut events = Vec::new();
    let from_progress = token.progress;
    let from_state = token.state;

    if from_state == TokenState::Hell {
        token.state = TokenState::Road;
        token.progress = 0;
        info!(%token_id, "token exits hell");
        events.push(GameEvent::TokenExitedHell { seq: 0, player_id, token_id: token_id.to_string(), roll_used: roll });
    } else {
        let to_progress = from_progress + u32::from(roll);
        let to_state = next_state(to_progress, &state.board_setup);
        token.progress = to_progress;
        token.state = to_state;
        events.push(GameEvent::TokenMoved {
            seq: 0,
            player_id,
            token_id: token_id.to_string(),
            from_progress,
            to_progress,
            from_state,
            to_state,
            roll_used: roll,
        });
        if to_state == TokenState::Heaven {
            events.push(GameEvent::TokenReachedHeaven { seq: 0, player_id, token_id: token_id.to_string() });
        }
    }

    let progress = player.token(token_id).expect("token must exist").progress;
    let state_now = player.token(token_id).expect("token must exist").state;
    let moved = if state_now == TokenState::Road {
        Some(MovedPiece { id: token_id.to_string(), token_ids: vec![token_id.to_string()], progress })
    } else {
        None
    };

    (new_state, events, moved)
}

fn apply_stack_move(state: &GameState, player_id: Uuid, stack_id: &str, roll: u8) -> (GameState, Vec<GameEvent>, Option<MovedPiece>) {
    let mut new_state = state.clone();
    let player = new_state.player_mut(player_id).expect("player must exist");
    let stack = player.stack(stack_id).expect("stack must exist").clone();
    let height = stack.height() as u32;
    let effective_roll = u32::from(roll) / height;

    let first_id = stack.token_ids[0].clone();
    let from_progress = player.token(&first_id).expect("stack token must exist").progress;
    let to_progress = from_progress + effective_roll;
    let to_state = next_state(to_progress, &state.board_setup);

    for token_id in &stack.token_ids {
        let token = player.token_mut(token_id).expect("stack token must exist");
        token.progress = to_progress;
        token.state = to_state;
    }

    let mut events = vec![GameEvent::StackMoved {
        seq: 0,
        player_id,
        stack_id: stack_id.to_string(),
        from_progress,
        to_progress,
        effective_roll,
    }];

    if to_state == TokenState::Heaven {
        for token_id in &stack.token_ids {
            events.push(GameEvent::TokenReachedHeaven { seq: 0, player_id, token_id: token_id.clone() });
        }
        player.stacks.retain(|s| s.stack_id != stack_id);
        for token_id in &stack.token_ids {
            if let Some(t) = player.token_mut(token_id) {
                t.in_stack = false;
            }
        }
    }

    let moved = if to_state == TokenState::Road {
        Some(MovedPiece { id: stack_id.to_string(), token_ids: stack.token_ids.clone(), progress: to_progress })
    } else {
        None
    };

    (new_state, events, moved)
}

fn apply_partial_split(state: &GameState, player_id: Uuid, stack_id: &str, k: usize, roll: u8) -> (GameState, Vec<GameEvent>, Option<MovedPiece>) {
    let mut new_state = state.clone();
    let player = new_state.player_mut(player_id).expect("player must exist");
    let stack = player.stack(stack_id).expect("stack must exist").clone();
    let effective_roll = u32::from(roll) / k as u32;

    let moving_ids: Vec<String> = stack.token_ids[..k].to_vec();
    let remaining_ids: Vec<String> = stack.token_ids[k..].to_vec();

    let first_id = moving_ids[0].clone();
    let from_progress = player.token(&first_id).expect("stack token must exist").progress;
    let to_progress = from_progress + effective_roll;
    let to_state = next_state(to_progress, &state.board_setup);

    for token_id in &moving_ids {
        let token = player.token_mut(token_id).expect("stack token must exist");
        token.progress = to_progress;
        token.state = to_state;
        token.in_stack = moving_ids.len() > 1;
    }

    player.stacks.retain(|s| s.stack_id != stack_id);
    if remaining_ids.len() > 1 {
        player.stacks.push(super::model::Stack { stack_id: stack_id.to_string(), token_ids: remaining_ids.clone() });
    } else if let Some(only) = remaining_ids.first() {
        if let Some(t) = player.token_mut(only) {
            t.in_stack = false;
        }
    }

    let new_moving_id = if moving_ids.len() > 1 {
        let new_id = format!("{}_stack_{}", player_id, new_state.next_stack_id);
        new_state.next_stack_id += 1;
        let player = new_state.player_mut(player_id).expect("player must exist");
        player.stacks.push(super::model::Stack { stack_id: new_id.clone(), token_ids: moving_ids.clone() });
        new_id
    } else {
        moving_ids[0].clone()
    };

    let events = vec![GameEvent::StackSplit {
        seq: 0,
        player_id,
        stack_id: stack_id.to_string(),
        moving_token_ids: moving_ids.clone(),
        remaining_token_ids: remaining_ids,
    }];

    let moved = if to_state == TokenState::Road {
        Some(MovedPiece { id: new_moving_id, token_ids: moving_ids, progress: to_progress })
    } else {
        None
    };

    (new_state, events, moved)
}

/// Mirrors the original ruleset's (unexported) `process_after_move` step:
/// consume the roll that was just allocated, then decide whether another
/// queued roll, a capture-granted extra roll, or the next player takes over.
fn finish_turn(mut state: GameState, mut events: Vec<GameEvent>, player_id: Uuid, consumed_roll: u8) -> ProcessResult {
    let turn = state.current_turn.as_mut().expect("turn must still be active");
    if turn.rolls_to_allocate.first() == Some(&consumed_roll) {
        turn.rolls_to_allocate.remove(0);
    }

    let turn = state.current_turn.clone().expect("turn must still be active");

    if let Some(&next_roll) = turn.rolls_to_allocate.first() {
        let player = state.player(player_id).expect("player must exist");
        let legal_moves = get_legal_moves(player, next_roll, &state.board_setup);
        if legal_moves.is_empty() {
            return end_turn(state, events, player_id, "no_legal_moves");
        }
        let turn_mut = state.current_turn.as_mut().expect("turn must still be active");
        turn_mut.legal_moves = legal_moves.clone();
        events.push(GameEvent::AwaitingChoice { seq: 0, player_id, legal_moves, roll_to_allocate: next_roll });
        state.current_event = CurrentEvent::PlayerChoice;
        return ProcessResult::ok(state, events);
    }

    if turn.extra_rolls > 0 {
        let turn_mut = state.current_turn.as_mut().expect("turn must still be active");
        turn_mut.extra_rolls -= 1;
        turn_mut.legal_moves.clear();
        state.current_event = CurrentEvent::PlayerRoll;
        return ProcessResult::ok(state, events);
    }

    end_turn(state, events, player_id, "all_rolls_used")
}

fn end_turn(mut state: GameState, mut events: Vec<GameEvent>, player_id: Uuid, reason: &str) -> ProcessResult {
    let current_turn_order = state.current_turn.as_ref().expect("turn must still be active").current_turn_order;
    let next_turn_order = state.next_turn_order(current_turn_order);
    let next_player = state.player_by_turn_order(next_turn_order).expect("next turn order must resolve").player_id;

    events.push(GameEvent::TurnEnded { seq: 0, player_id, reason: reason.to_string(), next_player_id: next_player });
    events.push(GameEvent::TurnStarted { seq: 0, player_id: next_player, turn_number: next_turn_order });

    state.current_event = CurrentEvent::PlayerRoll;
    state.current_turn = Some(super::rolling::create_new_turn(next_turn_order, &state));
    ProcessResult::ok(state, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::model::{BoardSetup, Player, Token, Turn};

    fn two_player_state(p1: Uuid, p2: Uuid, p1_progress: u32) -> GameState {
        GameState {
            phase: GamePhase::InProgress,
            players: vec![
                Player {
                    player_id: p1,
                    name: "P1".into(),
                    color: "red".into(),
                    turn_order: 1,
                    abs_starting_index: 0,
                    tokens: vec![
                        Token { token_id: format!("{p1}_token_1"), state: TokenState::Road, progress: p1_progress, in_stack: false },
                        Token::new_in_hell(format!("{p1}_token_2")),
                    ],
                    stacks: vec![],
                },
                Player {
                    player_id: p2,
                    name: "P2".into(),
                    color: "blue".into(),
                    turn_order: 2,
                    abs_starting_index: 26,
                    tokens: vec![Token::new_in_hell(format!("{p2}_token_1"))],
                    stacks: vec![],
                },
            ],
            current_event: CurrentEvent::PlayerChoice,
            board_setup: BoardSetup::two_player(),
            current_turn: Some(Turn::fresh(p1, 1)),
            event_seq: 0,
            next_stack_id: 0,
        }
    }

    #[test]
    fn token_moves_forward_on_road() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let mut state = two_player_state(p1, p2, 10);
        state.current_turn.as_mut().unwrap().rolls_to_allocate = vec![4];
        let token_id = format!("{p1}_token_1");
        let result = process_move(&state, &token_id, p1);
        assert!(result.success);
        let new_state = result.state.unwrap();
        let token = new_state.player(p1).unwrap().token(&token_id).unwrap();
        assert_eq!(token.progress, 14);
        assert!(result.events.iter().any(|e| e.event_type() == "token_moved"));
    }

    #[test]
    fn token_transitions_to_homestretch() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let mut state = two_player_state(p1, p2, 50);
        state.current_turn.as_mut().unwrap().rolls_to_allocate = vec![4];
        let token_id = format!("{p1}_token_1");
        let result = process_move(&state, &token_id, p1);
        let new_state = result.state.unwrap();
        let token = new_state.player(p1).unwrap().token(&token_id).unwrap();
        assert_eq!(token.state, TokenState::Homestretch);
    }

    /// Builds a p1 with `stack_len` tokens all progressed to 10 and grouped
    /// into a single stack `p1_stack_1`, plus a minimal p2.
    fn stacked_state(p1: Uuid, p2: Uuid, stack_len: usize) -> GameState {
        let token_ids: Vec<String> = (1..=stack_len).map(|n| format!("{p1}_token_{n}")).collect();
        let tokens = token_ids
            .iter()
            .map(|id| Token { token_id: id.clone(), state: TokenState::Road, progress: 10, in_stack: true })
            .collect();
        GameState {
            phase: GamePhase::InProgress,
            players: vec![
                Player {
                    player_id: p1,
                    name: "P1".into(),
                    color: "red".into(),
                    turn_order: 1,
                    abs_starting_index: 0,
                    tokens,
                    stacks: vec![super::model::Stack { stack_id: "p1_stack_1".into(), token_ids }],
                },
                Player {
                    player_id: p2,
                    name: "P2".into(),
                    color: "blue".into(),
                    turn_order: 2,
                    abs_starting_index: 26,
                    tokens: vec![Token::new_in_hell(format!("{p2}_token_1"))],
                    stacks: vec![],
                },
            ],
            current_event: CurrentEvent::PlayerChoice,
            board_setup: BoardSetup::two_player(),
            current_turn: Some(Turn::fresh(p1, 1)),
            event_seq: 0,
            next_stack_id: 0,
        }
    }

    #[test]
    fn partial_split_leaves_both_groups_stacked_when_both_multi() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let mut state = stacked_state(p1, p2, 4);
        state.current_turn.as_mut().unwrap().rolls_to_allocate = vec![6];
        let result = process_move(&state, "p1_stack_1:2", p1);
        assert!(result.success);
        let new_state = result.state.unwrap();
        let player = new_state.player(p1).unwrap();

        let moving_ids: Vec<String> = (1..=2).map(|n| format!("{p1}_token_{n}")).collect();
        let remaining_ids: Vec<String> = (3..=4).map(|n| format!("{p1}_token_{n}")).collect();

        for id in &moving_ids {
            assert!(player.token(id).unwrap().in_stack, "moving token {id} should stay in_stack");
        }
        for id in &remaining_ids {
            assert!(player.token(id).unwrap().in_stack, "remaining token {id} should stay in_stack");
        }

        assert_eq!(player.stacks.len(), 2);
        let remaining_stack = player.stacks.iter().find(|s| s.stack_id == "p1_stack_1").expect("remaining stack kept");
        assert_eq!(remaining_stack.token_ids, remaining_ids);
        let moving_stack = player.stacks.iter().find(|s| s.stack_id != "p1_stack_1").expect("new stack for movers");
        assert_eq!(moving_stack.token_ids, moving_ids);
    }

    #[test]
    fn partial_split_loosens_lone_remainder() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let mut state = stacked_state(p1, p2, 3);
        state.current_turn.as_mut().unwrap().rolls_to_allocate = vec![6];
        let result = process_move(&state, "p1_stack_1:2", p1);
        assert!(result.success);
        let new_state = result.state.unwrap();
        let player = new_state.player(p1).unwrap();

        let moving_ids: Vec<String> = (1..=2).map(|n| format!("{p1}_token_{n}")).collect();
        let lone_id = format!("{p1}_token_3");

        for id in &moving_ids {
            assert!(player.token(id).unwrap().in_stack, "pair of movers should stay in_stack");
        }
        assert!(!player.token(&lone_id).unwrap().in_stack, "lone remainder must not be in_stack");

        assert_eq!(player.stacks.len(), 1);
        assert!(player.stacks.iter().all(|s| !s.token_ids.contains(&lone_id)), "lone remainder must not belong to any stack");
    }

    #[test]
    fn partial_split_loosens_lone_mover() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let mut state = stacked_state(p1, p2, 3);
        state.current_turn.as_mut().unwrap().rolls_to_allocate = vec![6];
        let result = process_move(&state, "p1_stack_1:1", p1);
        assert!(result.success);
        let new_state = result.state.unwrap();
        let player = new_state.player(p1).unwrap();

        let mover_id = format!("{p1}_token_1");
        let remaining_ids: Vec<String> = (2..=3).map(|n| format!("{p1}_token_{n}")).collect();

        assert!(!player.token(&mover_id).unwrap().in_stack, "lone mover must not be in_stack");
        assert!(player.stacks.iter().all(|s| !s.token_ids.contains(&mover_id)), "lone mover must not belong to any stack");

        for id in &remaining_ids {
            assert!(player.token(id).unwrap().in_stack, "remaining pair should stay in_stack");
        }
        assert_eq!(player.stacks.len(), 1);
        assert_eq!(player.stacks[0].token_ids, remaining_ids);
    }
}
