//! Capture Tally
//!
//! Shared grouping logic for the generator and crystal capture machines:
//! tokens standing on a cell are grouped by owner, and the owner with the
//! strictly largest group dominates. A tie for the largest group means nobody
//! dominates.

use std::collections::BTreeMap;

use crate::game::player::PlayerId;
use crate::game::token::TokenId;

/// `(token_id, owner)` pairs for tokens standing on one cell.
pub type CellTokens = [(TokenId, PlayerId)];

/// Tokens on a cell grouped by owner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureTally {
    by_player: BTreeMap<PlayerId, Vec<TokenId>>,
}

impl CaptureTally {
    /// Group tokens by owner, keeping arrival order within each group.
    pub fn from_tokens(tokens: &CellTokens) -> Self {
        let mut by_player: BTreeMap<PlayerId, Vec<TokenId>> = BTreeMap::new();
        for (token_id, owner) in tokens {
            by_player.entry(owner.clone()).or_default().push(*token_id);
        }
        Self { by_player }
    }

    /// No tokens at all?
    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }

    /// Number of distinct owners present.
    pub fn contender_count(&self) -> usize {
        self.by_player.len()
    }

    /// Tokens a player has here.
    pub fn tokens_of(&self, player_id: &PlayerId) -> &[TokenId] {
        self.by_player
            .get(player_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every token present, grouped by owner.
    pub fn all_tokens(&self) -> Vec<TokenId> {
        self.by_player.values().flatten().copied().collect()
    }

    /// The owner with the unique largest group, with its token ids.
    pub fn dominant(&self) -> Option<(&PlayerId, &[TokenId])> {
        let mut best: Option<(&PlayerId, &[TokenId])> = None;
        let mut best_count = 0;
        let mut tied = false;

        for (player_id, token_ids) in &self.by_player {
            let count = token_ids.len();
            if count > best_count {
                best = Some((player_id, token_ids.as_slice()));
                best_count = count;
                tied = false;
            } else if count == best_count && count > 0 {
                tied = true;
            }
        }

        if tied {
            None
        } else {
            best
        }
    }
}
