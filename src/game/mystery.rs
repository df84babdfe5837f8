//! Mystery Squares
//!
//! Landing on a mystery square flips a coin: heads heals the token to full,
//! tails sends it back to its owner's deployment zone (the first free cell,
//! else the corner itself).

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::core::grid::GridPos;
use crate::core::rng::DeterministicRng;
use crate::game::board::Board;
use crate::game::token::{Token, TokenId};

/// Mystery outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MysteryEffect {
    /// Restored to max health.
    Heal,
    /// Returned to the deployment zone.
    Teleport,
}

impl MysteryEffect {
    /// Text shown after the effect fires.
    pub fn description(self) -> &'static str {
        match self {
            MysteryEffect::Heal => "Healed to full health!",
            MysteryEffect::Teleport => "Teleported back to deployment area!",
        }
    }

    /// Text shown before the effect fires.
    pub fn preview(self) -> &'static str {
        match self {
            MysteryEffect::Heal => "Token will be healed to maximum health",
            MysteryEffect::Teleport => "Token will be sent back to deployment area",
        }
    }
}

/// What a mystery square did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysteryEventResult {
    /// Outcome.
    pub effect: MysteryEffect,
    /// Token affected.
    pub token_id: TokenId,
    /// Position before.
    pub old_position: GridPos,
    /// Position after.
    pub new_position: GridPos,
    /// Health before.
    pub old_health: u8,
    /// Health after.
    pub new_health: u8,
}

impl fmt::Display for MysteryEventResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effect {
            MysteryEffect::Heal => write!(
                f,
                "Token {} healed from {} to {}",
                self.token_id, self.old_health, self.new_health
            ),
            MysteryEffect::Teleport => write!(
                f,
                "Token {} teleported from {} to {}",
                self.token_id, self.old_position, self.new_position
            ),
        }
    }
}

/// Only living tokens trigger mystery squares.
#[inline]
pub fn can_trigger(token: &Token) -> bool {
    token.is_alive
}

/// Where a teleported token lands: first free deployable cell, else the corner.
pub fn teleport_destination(board: &Board, player_index: usize) -> GridPos {
    board
        .get_deployable_positions(player_index)
        .into_iter()
        .find(|pos| !board.is_occupied(*pos))
        .unwrap_or_else(|| board.get_starting_position(player_index))
}

/// Fire the mystery effect on a token.
///
/// Mutates only the token. Board occupancy is the caller's to update
/// (`GameState::trigger_mystery` does both).
pub fn trigger_mystery_event(
    token: &mut Token,
    board: &Board,
    player_index: usize,
    rng: &mut DeterministicRng,
) -> MysteryEventResult {
    let old_position = token.position;
    let old_health = token.health;

    let effect = if rng.coin_flip() {
        token.heal_to_full();
        MysteryEffect::Heal
    } else {
        token.move_to(teleport_destination(board, player_index));
        MysteryEffect::Teleport
    };

    MysteryEventResult {
        effect,
        token_id: token.id,
        old_position,
        new_position: token.position,
        old_health,
        new_health: token.health,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::PlayerId;
    use crate::game::token::HealthTier;

    fn wounded_token() -> Token {
        let mut token = Token::new(1, PlayerId::from("p1"), HealthTier::Ten, GridPos::new(8, 8));
        token.is_deployed = true;
        token.take_damage(6);
        token
    }

    #[test]
    fn test_outcomes_are_balanced_and_well_formed() {
        let board = Board::empty(24, 24);
        let mut rng = DeterministicRng::new(31337);
        let (mut heals, mut teleports) = (0, 0);

        for _ in 0..1000 {
            let mut token = wounded_token();
            let result = trigger_mystery_event(&mut token, &board, 0, &mut rng);
            match result.effect {
                MysteryEffect::Heal => {
                    heals += 1;
                    assert_eq!(result.new_health, 10);
                    assert_eq!(result.new_position, result.old_position);
                }
                MysteryEffect::Teleport => {
                    teleports += 1;
                    assert_eq!(result.new_health, 4);
                    assert_eq!(result.new_position, GridPos::new(0, 0));
                }
            }
        }

        assert!((400..=600).contains(&heals), "heals = {}", heals);
        assert!((400..=600).contains(&teleports), "teleports = {}", teleports);
    }

    #[test]
    fn test_teleport_skips_occupied_cells() {
        let mut board = Board::empty(24, 24);
        board.add_occupant(GridPos::new(23, 0), 50);
        board.add_occupant(GridPos::new(23, 1), 51);
        assert_eq!(teleport_destination(&board, 1), GridPos::new(23, 2));
    }

    #[test]
    fn test_teleport_falls_back_to_corner() {
        let mut board = Board::empty(24, 24);
        for (i, pos) in board.get_deployable_positions(2).into_iter().enumerate() {
            board.add_occupant(pos, 100 + i as TokenId);
        }
        assert_eq!(teleport_destination(&board, 2), GridPos::new(0, 23));
    }

    #[test]
    fn test_same_seed_same_effects() {
        let board = Board::empty(24, 24);
        let run = |seed| {
            let mut rng = DeterministicRng::new(seed);
            (0..20)
                .map(|_| trigger_mystery_event(&mut wounded_token(), &board, 0, &mut rng).effect)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_descriptions() {
        assert!(can_trigger(&wounded_token()));
        assert_eq!(MysteryEffect::Heal.description(), "Healed to full health!");
        assert!(MysteryEffect::Teleport.preview().contains("deployment"));
    }
}
