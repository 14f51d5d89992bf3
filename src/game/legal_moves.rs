use super::model::{BoardSetup, Player, TokenState};

/// Ported from the original ruleset's `get_legal_moves`/`has_any_legal_moves`
/// pair (SPEC_FULL.md §4.8.4). Pure function of `(player, roll, board)` —
/// Testable Property 6 depends on this never consulting anything else.
pub fn get_legal_moves(player: &Player, roll: u8, board: &BoardSetup) -> Vec<String> {
    let mut moves = Vec::new();

    for token in &player.tokens {
        if token.in_stack || token.state == TokenState::Heaven {
            continue;
        }
        match token.state {
            TokenState::Hell => {
                if board.get_out_rolls.contains(&roll) {
                    moves.push(token.token_id.clone());
                }
            }
            TokenState::Road | TokenState::Homestretch => {
                if token.progress + u32::from(roll) <= board.squares_to_win {
                    moves.push(token.token_id.clone());
                }
            }
            TokenState::Heaven => unreachable!("filtered above"),
        }
    }

    for stack in &player.stacks {
        let Some(first_id) = stack.token_ids.first() else { continue };
        let Some(first) = player.token(first_id) else { continue };
        if !matches!(first.state, TokenState::Road | TokenState::Homestretch) {
            continue;
        }
        let h = stack.height() as u32;
        let roll_u32 = u32::from(roll);

        if roll_u32 % h == 0 && first.progress + roll_u32 / h <= board.squares_to_win {
            moves.push(stack.stack_id.clone());
        }

        for k in 1..h {
            if roll_u32 % k == 0 && first.progress + roll_u32 / k <= board.squares_to_win {
                moves.push(format!("{}:{}", stack.stack_id, k));
            }
        }
    }

    moves
}

pub fn has_any_legal_moves(player: &Player, roll: u8, board: &BoardSetup) -> bool {
    !get_legal_moves(player, roll, board).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::model::Token;

    fn player_with(tokens: Vec<Token>) -> Player {
        Player {
            player_id: uuid::Uuid::new_v4(),
            name: "P".into(),
            color: "red".into(),
            turn_order: 1,
            abs_starting_index: 0,
            tokens,
            stacks: vec![],
        }
    }

    #[test]
    fn hell_token_needs_get_out_roll() {
        let board = BoardSetup::two_player();
        let p = player_with(vec![Token::new_in_hell("t1")]);
        assert!(get_legal_moves(&p, 3, &board).is_empty());
        assert_eq!(get_legal_moves(&p, 6, &board), vec!["t1".to_string()]);
    }

    #[test]
    fn road_token_excluded_when_overshooting() {
        let board = BoardSetup::two_player();
        let mut p = player_with(vec![Token::new_in_hell("t1")]);
        p.tokens[0].state = TokenState::Homestretch;
        p.tokens[0].progress = 55;
        assert!(get_legal_moves(&p, 3, &board).is_empty());
        assert_eq!(get_legal_moves(&p, 2, &board), vec!["t1".to_string()]);
    }

    #[test]
    fn heaven_token_never_legal() {
        let board = BoardSetup::two_player();
        let mut p = player_with(vec![Token::new_in_hell("t1")]);
        p.tokens[0].state = TokenState::Heaven;
        p.tokens[0].progress = 57;
        for roll in 1..=6 {
            assert!(get_legal_moves(&p, roll, &board).is_empty());
        }
    }
}
