use tracing::{debug, info};

use super::events::GameEvent;
use super::model::{BoardSetup, GameState, Player, TokenState};
use super::result::CollisionResult;

/// A piece that just finished moving: either a lone token or a (possibly
/// partial) group of stacked tokens sharing one position.
pub struct MovedPiece {
    pub id: String,
    pub token_ids: Vec<String>,
    pub progress: u32,
}

fn absolute_position(player: &Player, progress: u32, board: &BoardSetup) -> u32 {
    (player.abs_starting_index + progress) % board.squares_to_homestretch
}

struct Collider {
    player_id: uuid::Uuid,
    id: String,
    token_ids: Vec<String>,
}

fn detect_collisions(state: &GameState, moved: &MovedPiece, moving_player_id: uuid::Uuid, board: &BoardSetup) -> Vec<Collider> {
    let moving_player = state.player(moving_player_id).expect("moving player must exist");
    let moved_abs = absolute_position(moving_player, moved.progress, board);
    let mut hits = Vec::new();

    for player in &state.players {
        for token in &player.tokens {
            if moved.token_ids.iter().any(|t| t == &token.token_id) {
                continue;
            }
            if token.in_stack || token.state != TokenState::Road {
                continue;
            }
            if absolute_position(player, token.progress, board) == moved_abs {
                hits.push(Collider { player_id: player.player_id, id: token.token_id.clone(), token_ids: vec![token.token_id.clone()] });
            }
        }

        for stack in &player.stacks {
            if stack.stack_id == moved.id {
                continue;
            }
            let Some(first_id) = stack.token_ids.first() else { continue };
            let Some(first) = player.token(first_id) else { continue };
            if first.state != TokenState::Road {
                continue;
            }
            if absolute_position(player, first.progress, board) == moved_abs {
                hits.push(Collider { player_id: player.player_id, id: stack.stack_id.clone(), token_ids: stack.token_ids.clone() });
            }
        }
    }

    hits
}

/// Ported from the original ruleset's `resolve_collision`/`resolve_stacking`/
/// `resolve_capture` (SPEC_FULL.md §4.8.5). Only ever called for a piece that
/// just landed on ROAD — HOMESTRETCH and HELL never collide.
pub fn resolve_collisions_after_move(
    state: &GameState,
    moved: &MovedPiece,
    moving_player_id: uuid::Uuid,
) -> CollisionResult {
    let board = state.board_setup.clone();
    let collisions = detect_collisions(state, moved, moving_player_id, &board);
    if collisions.is_empty() {
        return CollisionResult::unchanged(state.clone());
    }

    let mut current = state.clone();
    let mut events = Vec::new();

    for hit in collisions {
        if hit.player_id == moving_player_id {
            let result = resolve_stacking(&current, moving_player_id, moved, &hit.token_ids);
            current = result.state;
            events.extend(result.events);
            continue;
        }

        let moving_player = current.player(moving_player_id).expect("moving player must exist");
        let moved_abs = absolute_position(moving_player, moved.progress, &board);
        if board.safe_spaces.contains(&moved_abs) {
            info!(position = moved_abs, "safe space, no capture");
            continue;
        }

        let result = resolve_capture(&current, moving_player_id, moved, hit.player_id, &hit, moved_abs);
        current = result.state;
        events.extend(result.events);
    }

    CollisionResult { state: current, events, requires_choice: false }
}

fn resolve_stacking(state: &GameState, player_id: uuid::Uuid, moved: &MovedPiece, other_token_ids: &[String]) -> CollisionResult {
    let mut token_ids: Vec<String> = moved.token_ids.to_vec();
    token_ids.extend(other_token_ids.iter().cloned());

    let mut new_state = state.clone();
    let stack_id = format!("{}_stack_{}", player_id, new_state.next_stack_id);
    new_state.next_stack_id += 1;

    let player = new_state.player_mut(player_id).expect("player must exist");
    for token in player.tokens.iter_mut() {
        if token_ids.iter().any(|id| id == &token.token_id) {
            token.in_stack = true;
        }
    }
    player.stacks.retain(|s| s.stack_id != moved.id && !other_token_ids.iter().any(|t| s.token_ids.contains(t)));
    let position = player.token(&token_ids[0]).expect("first token must exist").progress;
    player.stacks.push(super::model::Stack { stack_id: stack_id.clone(), token_ids: token_ids.clone() });

    info!(%stack_id, ?token_ids, "stack formed");
    let events = vec![GameEvent::StackFormed { seq: 0, player_id, stack_id, token_ids, progress: position }];
    CollisionResult { state: new_state, events, requires_choice: false }
}

fn resolve_capture(
    state: &GameState,
    capturing_player_id: uuid::Uuid,
    moved: &MovedPiece,
    captured_player_id: uuid::Uuid,
    hit: &Collider,
    position: u32,
) -> CollisionResult {
    let capturing_size = moved.token_ids.len();
    let captured_size = hit.token_ids.len();

    if captured_size > capturing_size {
        debug!(capturing_size, captured_size, "capture blocked, moving piece too small");
        return CollisionResult::unchanged(state.clone());
    }

    let mut new_state = state.clone();
    let captured_stack_id = new_state
        .player(captured_player_id)
        .and_then(|p| p.stacks.iter().find(|s| s.stack_id == hit.id).map(|s| s.stack_id.clone()));

    {
        let player = new_state.player_mut(captured_player_id).expect("captured player must exist");
        for token in player.tokens.iter_mut() {
            if hit.token_ids.iter().any(|id| id == &token.token_id) {
                token.state = TokenState::Hell;
                token.progress = 0;
                token.in_stack = false;
            }
        }
        player.stacks.retain(|s| !hit.token_ids.iter().any(|t| s.token_ids.contains(t)));
    }

    let mut events = Vec::new();
    if let Some(stack_id) = captured_stack_id {
        events.push(GameEvent::StackDissolved { seq: 0, player_id: captured_player_id, stack_id, reason: "captured".into() });
    }
    for token_id in &hit.token_ids {
        events.push(GameEvent::TokenCaptured {
            seq: 0,
            capturing_player_id,
            captured_player_id,
            token_id: token_id.clone(),
            position,
            grants_extra_roll: true,
        });
    }

    info!(%capturing_player_id, %captured_player_id, captured_size, "capture resolved");
    let turn = new_state.current_turn.as_mut().expect("capture requires an active turn");
    turn.extra_rolls += captured_size as u32;

    CollisionResult { state: new_state, events, requires_choice: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::model::{GamePhase, Player, Token, Turn};
    use uuid::Uuid;

    fn board_with_safe_spaces() -> BoardSetup {
        BoardSetup { safe_spaces: vec![0, 26], ..BoardSetup::two_player() }
    }

    fn state_with(p1: Player, p2: Player, board: BoardSetup) -> GameState {
        let p1_id = p1.player_id;
        GameState {
            phase: GamePhase::InProgress,
            players: vec![p1, p2],
            current_event: crate::game::model::CurrentEvent::PlayerChoice,
            board_setup: board,
            current_turn: Some(Turn::fresh(p1_id, 1)),
            event_seq: 0,
            next_stack_id: 0,
        }
    }

    #[test]
    fn capture_off_a_non_safe_space_sends_target_to_hell_and_grants_a_roll() {
        // S4: squares_to_homestretch=52, safe_spaces=[0,26]. P1 at progress 5
        // (abs=5), P2 at progress 34 (abs=(26+34)%52=8, not safe).
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let board = board_with_safe_spaces();
        let p1_player = Player {
            player_id: p1,
            name: "P1".into(),
            color: "red".into(),
            turn_order: 1,
            abs_starting_index: 0,
            tokens: vec![Token { token_id: "t1_token_1".into(), state: TokenState::Road, progress: 8, in_stack: false }],
            stacks: vec![],
        };
        let p2_player = Player {
            player_id: p2,
            name: "P2".into(),
            color: "blue".into(),
            turn_order: 2,
            abs_starting_index: 26,
            tokens: vec![Token { token_id: "t2_token_1".into(), state: TokenState::Road, progress: 34, in_stack: false }],
            stacks: vec![],
        };
        let state = state_with(p1_player, p2_player, board);
        let moved = MovedPiece { id: "t1_token_1".into(), token_ids: vec!["t1_token_1".into()], progress: 8 };

        let result = resolve_collisions_after_move(&state, &moved, p1);

        assert!(result.events.iter().any(|e| e.event_type() == "token_captured"));
        let captured_token = result.state.player(p2).unwrap().token("t2_token_1").unwrap();
        assert_eq!(captured_token.state, TokenState::Hell);
        assert_eq!(captured_token.progress, 0);
        assert_eq!(result.state.current_turn.as_ref().unwrap().extra_rolls, 1);
    }

    #[test]
    fn landing_on_a_safe_space_does_not_capture() {
        // S5: P1 lands at abs=49 (not a safe space boundary issue here since
        // the mover's own position is irrelevant) while P2 sits at abs=0,
        // a safe space — no capture even though positions would otherwise
        // collide were they to coincide.
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let board = board_with_safe_spaces();
        let p1_player = Player {
            player_id: p1,
            name: "P1".into(),
            color: "red".into(),
            turn_order: 1,
            abs_starting_index: 0,
            tokens: vec![Token { token_id: "t1_token_1".into(), state: TokenState::Road, progress: 0, in_stack: false }],
            stacks: vec![],
        };
        let p2_player = Player {
            player_id: p2,
            name: "P2".into(),
            color: "blue".into(),
            turn_order: 2,
            abs_starting_index: 26,
            tokens: vec![Token { token_id: "t2_token_1".into(), state: TokenState::Road, progress: 26, in_stack: false }],
            stacks: vec![],
        };
        let state = state_with(p1_player, p2_player, board);
        let moved = MovedPiece { id: "t1_token_1".into(), token_ids: vec!["t1_token_1".into()], progress: 0 };

        let result = resolve_collisions_after_move(&state, &moved, p1);

        assert!(!result.events.iter().any(|e| e.event_type() == "token_captured"));
        let p2_token = result.state.player(p2).unwrap().token("t2_token_1").unwrap();
        assert_eq!(p2_token.state, TokenState::Road);
        assert_eq!(p2_token.progress, 26);
    }

    #[test]
    fn same_player_collision_forms_a_stack() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let board = BoardSetup::two_player();
        let p1_player = Player {
            player_id: p1,
            name: "P1".into(),
            color: "red".into(),
            turn_order: 1,
            abs_starting_index: 0,
            tokens: vec![
                Token { token_id: "t1_token_1".into(), state: TokenState::Road, progress: 10, in_stack: false },
                Token { token_id: "t1_token_2".into(), state: TokenState::Road, progress: 10, in_stack: false },
            ],
            stacks: vec![],
        };
        let p2_player = Player {
            player_id: p2,
            name: "P2".into(),
            color: "blue".into(),
            turn_order: 2,
            abs_starting_index: 26,
            tokens: vec![],
            stacks: vec![],
        };
        let state = state_with(p1_player, p2_player, board);
        let moved = MovedPiece { id: "t1_token_1".into(), token_ids: vec!["t1_token_1".into()], progress: 10 };

        let result = resolve_collisions_after_move(&state, &moved, p1);

        assert!(result.events.iter().any(|e| e.event_type() == "stack_formed"));
        let player = result.state.player(p1).unwrap();
        assert_eq!(player.stacks.len(), 1);
        assert!(player.token("t1_token_1").unwrap().in_stack);
        assert!(player.token("t1_token_2").unwrap().in_stack);
    }
}
