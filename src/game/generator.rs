//! Generators
//!
//! Four capturable generators, one per quadrant. Holding a generator with at
//! least two tokens of one player for two consecutive end-of-turn
//! evaluations disables it permanently, which lowers the crystal's token
//! requirement.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::core::grid::GridPos;
use crate::game::capture::{CaptureTally, CellTokens};
use crate::game::player::PlayerId;
use crate::game::token::TokenId;

/// Generator identifier (its index on the board).
pub type GeneratorId = u32;

/// One generator's capture state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    /// Index.
    pub id: GeneratorId,
    /// Board cell.
    pub position: GridPos,
    /// Player currently building a capture.
    pub capturing_player_id: Option<PlayerId>,
    /// That player's tokens on the generator at the last evaluation.
    pub capture_token_ids: Vec<TokenId>,
    /// Consecutive evaluations held by `capturing_player_id`.
    pub turns_held: u32,
    /// Permanently captured.
    pub is_disabled: bool,
}

impl Generator {
    /// Tokens needed to hold a generator.
    pub const TOKENS_REQUIRED: usize = 2;
    /// Consecutive evaluations needed to disable it.
    pub const TURNS_REQUIRED: u32 = 2;
    /// Crystal requirement reduction per disabled generator.
    pub const TOKEN_REDUCTION: u32 = 2;

    /// Fresh generator.
    pub fn new(id: GeneratorId, position: GridPos) -> Self {
        Self {
            id,
            position,
            capturing_player_id: None,
            capture_token_ids: Vec::new(),
            turns_held: 0,
            is_disabled: false,
        }
    }

    /// Evaluate the tokens standing on the generator.
    ///
    /// Returns true only on the evaluation that disables it.
    pub fn update_capture_status(&mut self, tokens: &CellTokens) -> bool {
        if self.is_disabled {
            return false;
        }

        self.capture_token_ids.clear();
        let tally = CaptureTally::from_tokens(tokens);

        match tally.dominant() {
            Some((player_id, token_ids)) if token_ids.len() >= Self::TOKENS_REQUIRED => {
                self.capture_token_ids = token_ids.to_vec();
                if self.capturing_player_id.as_ref() == Some(player_id) {
                    self.turns_held += 1;
                    if self.turns_held >= Self::TURNS_REQUIRED {
                        self.is_disabled = true;
                        return true;
                    }
                } else {
                    self.capturing_player_id = Some(player_id.clone());
                    self.turns_held = 1;
                }
            }
            _ => {
                self.capturing_player_id = None;
                self.turns_held = 0;
            }
        }

        false
    }

    /// Drop capture progress. No effect once disabled.
    pub fn reset_capture(&mut self) {
        if !self.is_disabled {
            self.capturing_player_id = None;
            self.turns_held = 0;
            self.capture_token_ids.clear();
        }
    }

    /// `(turns_held, turns_required)`.
    pub fn capture_progress(&self) -> (u32, u32) {
        (self.turns_held, Self::TURNS_REQUIRED)
    }
}

/// One generator per position, ids in position order.
pub fn create_generators(positions: &[GridPos]) -> Vec<Generator> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &pos)| Generator::new(i as GeneratorId, pos))
        .collect()
}

/// Evaluate every generator; returns the ids disabled by this evaluation.
pub fn update_all_generators(
    generators: &mut [Generator],
    tokens_by_position: &BTreeMap<GridPos, Vec<(TokenId, PlayerId)>>,
) -> Vec<GeneratorId> {
    let mut newly_disabled = Vec::new();

    for generator in generators.iter_mut() {
        let tokens = tokens_by_position
            .get(&generator.position)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        if generator.update_capture_status(tokens) {
            newly_disabled.push(generator.id);
        }
    }

    newly_disabled
}

/// How many generators are disabled.
pub fn count_disabled_generators(generators: &[Generator]) -> u32 {
    generators.iter().filter(|g| g.is_disabled).count() as u32
}

/// Generator standing on a position.
pub fn generator_at(generators: &[Generator], position: GridPos) -> Option<&Generator> {
    generators.iter().find(|g| g.position == position)
}

// =============================================================================
// TESTS
// =============================================================================
