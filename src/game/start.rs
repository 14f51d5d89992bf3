use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{BoardSetup, CurrentEvent, GamePhase, GameState, Player, Token};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAttributes {
    pub player_id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    pub num_players: usize,
    pub player_attributes: Vec<PlayerAttributes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsError {
    pub code: &'static str,
    pub message: &'static str,
}

/// Ported from the original ruleset's `validate_game_settings` (SPEC_FULL.md
/// §4.9): seat count, roster size, and uniqueness of id/name/color.
pub fn validate_game_settings(settings: &GameSettings) -> Result<(), SettingsError> {
    if settings.num_players < 2 || settings.num_players > 4 {
        return Err(SettingsError { code: "INVALID_PLAYER_COUNT", message: "a game needs between 2 and 4 players" });
    }
    if settings.player_attributes.len() != settings.num_players {
        return Err(SettingsError { code: "PLAYER_COUNT_MISMATCH", message: "player attribute count must match num_players" });
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    let mut colors = HashSet::new();
    for player in &settings.player_attributes {
        if !ids.insert(player.player_id) {
            return Err(SettingsError { code: "DUPLICATE_PLAYER_ID", message: "duplicate player id" });
        }
        if !names.insert(player.name.clone()) {
            return Err(SettingsError { code: "DUPLICATE_PLAYER_NAME", message: "duplicate player name" });
        }
        if !colors.insert(player.color.clone()) {
            return Err(SettingsError { code: "DUPLICATE_PLAYER_COLOR", message: "duplicate player color" });
        }
    }

    Ok(())
}

fn create_initial_tokens(player_id: Uuid) -> Vec<Token> {
    (1..=4).map(|i| Token::new_in_hell(format!("{player_id}_token_{i}"))).collect()
}

/// Ported from `initialize_game`: seats players in the order given (turn
/// order is seat index — see DESIGN.md, no shuffling) on the canonical
/// `BoardSetup::standard` board.
pub fn initialize_game(settings: &GameSettings) -> Result<GameState, SettingsError> {
    validate_game_settings(settings)?;

    let board_setup = BoardSetup::standard(settings.num_players);
    let players = settings
        .player_attributes
        .iter()
        .enumerate()
        .map(|(index, attr)| Player {
            player_id: attr.player_id,
            name: attr.name.clone(),
            color: attr.color.clone(),
            turn_order: (index + 1) as u32,
            abs_starting_index: board_setup.starting_positions[index],
            tokens: create_initial_tokens(attr.player_id),
            stacks: Vec::new(),
        })
        .collect();

    Ok(GameState {
        phase: GamePhase::NotStarted,
        players,
        current_event: CurrentEvent::PlayerRoll,
        board_setup,
        current_turn: None,
        event_seq: 0,
        next_stack_id: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(num_players: usize) -> GameSettings {
        GameSettings {
            num_players,
            player_attributes: (0..num_players)
                .map(|i| PlayerAttributes { player_id: Uuid::new_v4(), name: format!("P{i}"), color: format!("c{i}") })
                .collect(),
        }
    }

    #[test]
    fn rejects_single_player() {
        let err = validate_game_settings(&settings(1)).unwrap_err();
        assert_eq!(err.code, "INVALID_PLAYER_COUNT");
    }

    #[test]
    fn rejects_duplicate_color() {
        let mut s = settings(2);
        s.player_attributes[1].color = s.player_attributes[0].color.clone();
        let err = validate_game_settings(&s).unwrap_err();
        assert_eq!(err.code, "DUPLICATE_PLAYER_COLOR");
    }

    #[test]
    fn initializes_four_tokens_per_player_in_hell() {
        let state = initialize_game(&settings(4)).unwrap();
        assert_eq!(state.players.len(), 4);
        for player in &state.players {
            assert_eq!(player.tokens.len(), 4);
            assert!(player.tokens.iter().all(|t| t.state == super::super::model::TokenState::Hell));
        }
        assert_eq!(state.phase, GamePhase::NotStarted);
    }
}
