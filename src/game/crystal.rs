//! Crystal
//!
//! The win condition. A player wins by holding the crystal with enough
//! tokens for three consecutive end-of-turn evaluations. The token
//! requirement starts at 12 and drops by 2 for every disabled generator,
//! never below 1.

use serde::{Deserialize, Serialize};

use crate::core::grid::GridPos;
use crate::game::capture::{CaptureTally, CellTokens};
use crate::game::generator::Generator;
use crate::game::player::PlayerId;
use crate::game::token::TokenId;

/// Crystal hold state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crystal {
    /// Board cell.
    pub position: GridPos,
    /// Player currently holding.
    pub holding_player_id: Option<PlayerId>,
    /// Tokens on the crystal at the last evaluation: the holder's, or every
    /// token present while the hold is contested.
    pub holding_token_ids: Vec<TokenId>,
    /// Consecutive evaluations held.
    pub turns_held: u32,
    /// Requirement with no generators disabled.
    pub base_tokens_required: u32,
}

impl Crystal {
    /// Starting token requirement.
    pub const BASE_TOKENS_REQUIRED: u32 = 12;
    /// Consecutive evaluations needed to win.
    pub const TURNS_REQUIRED: u32 = 3;

    /// Unclaimed crystal.
    pub fn new(position: GridPos) -> Self {
        Self {
            position,
            holding_player_id: None,
            holding_token_ids: Vec::new(),
            turns_held: 0,
            base_tokens_required: Self::BASE_TOKENS_REQUIRED,
        }
    }

    /// `max(1, base - 2 * disabled)`.
    pub fn get_tokens_required(&self, disabled_generators: u32) -> u32 {
        let reduction = Generator::TOKEN_REDUCTION.saturating_mul(disabled_generators);
        self.base_tokens_required.saturating_sub(reduction).max(1)
    }

    /// Evaluate the tokens standing on the crystal.
    ///
    /// Returns the winner on the evaluation that completes a hold. The
    /// crystal itself never locks; ending the game is the caller's job.
    pub fn update_capture_status(&mut self, tokens: &CellTokens, disabled_generators: u32) -> Option<PlayerId> {
        self.holding_token_ids.clear();
        let required = self.get_tokens_required(disabled_generators) as usize;
        let tally = CaptureTally::from_tokens(tokens);

        match tally.dominant() {
            Some((player_id, token_ids)) if token_ids.len() >= required => {
                self.holding_token_ids = token_ids.to_vec();
                if self.holding_player_id.as_ref() == Some(player_id) {
                    self.turns_held += 1;
                    if self.turns_held >= Self::TURNS_REQUIRED {
                        return Some(player_id.clone());
                    }
                } else {
                    self.holding_player_id = Some(player_id.clone());
                    self.turns_held = 1;
                }
            }
            dominant => {
                if dominant.is_none() && tally.contender_count() > 1 {
                    self.holding_token_ids = tally.all_tokens();
                }
                self.holding_player_id = None;
                self.turns_held = 0;
            }
        }

        None
    }

    /// Drop hold progress.
    pub fn reset_capture(&mut self) {
        self.holding_player_id = None;
        self.turns_held = 0;
        self.holding_token_ids.clear();
    }

    /// `(turns_held, turns_required)`.
    pub fn capture_progress(&self) -> (u32, u32) {
        (self.turns_held, Self::TURNS_REQUIRED)
    }

    /// `(tokens on crystal, tokens required)`.
    pub fn token_requirement(&self, disabled_generators: u32) -> (u32, u32) {
        (
            self.holding_token_ids.len() as u32,
            self.get_tokens_required(disabled_generators),
        )
    }

    /// Several players tied on the crystal at the last evaluation.
    pub fn is_contested(&self) -> bool {
        self.holding_player_id.is_none() && !self.holding_token_ids.is_empty()
    }

    /// Human-readable hold status.
    pub fn status_message(&self, disabled_generators: u32) -> String {
        match &self.holding_player_id {
            None if self.is_contested() => "Crystal is contested".to_string(),
            None => "Crystal is unclaimed".to_string(),
            Some(holder) => {
                let (current, required) = self.token_requirement(disabled_generators);
                let (turns, turns_required) = self.capture_progress();
                format!(
                    "Player {} holds crystal with {}/{} tokens, {}/{} turns",
                    holder, current, required, turns, turns_required
                )
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(owner: &str, count: u32, first_id: TokenId) -> Vec<(TokenId, PlayerId)> {
        (0..count).map(|i| (first_id + i, PlayerId::from(owner))).collect()
    }

    #[test]
    fn test_requirement_formula() {
        let crystal = Crystal::new(GridPos::new(12, 12));
        assert_eq!(crystal.get_tokens_required(0), 12);
        assert_eq!(crystal.get_tokens_required(1), 10);
        assert_eq!(crystal.get_tokens_required(4), 4);
        assert_eq!(crystal.get_tokens_required(6), 1);
        assert_eq!(crystal.get_tokens_required(100), 1);
    }

    #[test]
    fn test_twelve_tokens_three_turns_wins() {
        let mut crystal = Crystal::new(GridPos::new(12, 12));
        let tokens = stack("a", 12, 0);

        assert_eq!(crystal.update_capture_status(&tokens, 0), None);
        assert_eq!(crystal.update_capture_status(&tokens, 0), None);
        assert_eq!(crystal.update_capture_status(&tokens, 0), Some(PlayerId::from("a")));
    }

    #[test]
    fn test_eleven_tokens_never_win_without_generators() {
        let mut crystal = Crystal::new(GridPos::new(12, 12));
        let tokens = stack("a", 11, 0);
        for _ in 0..5 {
            assert_eq!(crystal.update_capture_status(&tokens, 0), None);
        }
        assert_eq!(crystal.turns_held, 0);
    }

    #[test]
    fn test_disabled_generators_lower_requirement_live() {
        let mut crystal = Crystal::new(GridPos::new(12, 12));
        let tokens = stack("a", 4, 0);

        assert_eq!(crystal.update_capture_status(&tokens, 3), None);
        assert_eq!(crystal.turns_held, 0);

        assert_eq!(crystal.update_capture_status(&tokens, 4), None);
        assert_eq!(crystal.update_capture_status(&tokens, 4), None);
        assert_eq!(crystal.update_capture_status(&tokens, 4), Some(PlayerId::from("a")));
    }

    #[test]
    fn test_contested_crystal() {
        let mut crystal = Crystal::new(GridPos::new(12, 12));
        let mut tokens = stack("a", 2, 0);
        tokens.extend(stack("b", 2, 10));

        assert_eq!(crystal.update_capture_status(&tokens, 4), None);
        assert!(crystal.is_contested());
        assert_eq!(crystal.turns_held, 0);
        assert_eq!(crystal.status_message(4), "Crystal is contested");
    }

    #[test]
    fn test_interruption_resets() {
        let mut crystal = Crystal::new(GridPos::new(12, 12));
        let tokens = stack("a", 12, 0);
        crystal.update_capture_status(&tokens, 0);
        crystal.update_capture_status(&tokens, 0);
        crystal.update_capture_status(&stack("a", 11, 0), 0);
        assert_eq!(crystal.turns_held, 0);
        assert!(!crystal.is_contested());
        assert_eq!(crystal.status_message(0), "Crystal is unclaimed");
    }

    #[test]
    fn test_status_and_progress() {
        let mut crystal = Crystal::new(GridPos::new(12, 12));
        crystal.update_capture_status(&stack("a", 4, 0), 4);
        assert_eq!(crystal.capture_progress(), (1, 3));
        assert_eq!(crystal.token_requirement(4), (4, 4));
        assert_eq!(
            crystal.status_message(4),
            "Player a holds crystal with 4/4 tokens, 1/3 turns"
        );

        crystal.reset_capture();
        assert!(crystal.holding_player_id.is_none());
    }
}
