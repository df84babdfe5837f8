//! Game Events
//!
//! Records returned from state mutations (moves, attacks, mystery squares,
//! end-of-turn capture evaluation) for audio, animation and network
//! broadcast. The engine never pushes them anywhere itself.

use serde::{Deserialize, Serialize};

use crate::core::grid::GridPos;
use crate::game::combat::CombatOutcome;
use crate::game::generator::GeneratorId;
use crate::game::mystery::MysteryEventResult;
use crate::game::player::PlayerId;
use crate::game::token::{HealthTier, TokenId};

/// Presentation order within one turn.
///
/// Lower value = presented first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Token deaths first
    TokenDeath = 0,
    /// Then attacks
    Combat = 1,
    /// Then placement and movement
    Movement = 2,
    /// Then mystery effects
    Mystery = 3,
    /// Then generator / crystal changes
    Capture = 4,
    /// Then turn hand-off
    Turn = 5,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEventData {
    /// Token left reserve
    TokenDeployed {
        player_id: PlayerId,
        token_id: TokenId,
        tier: HealthTier,
        position: GridPos,
    },

    /// Token changed cell
    TokenMoved {
        player_id: PlayerId,
        token_id: TokenId,
        from: GridPos,
        to: GridPos,
    },

    /// Mystery square fired
    MysteryTriggered {
        result: MysteryEventResult,
    },

    /// Attack resolved
    CombatResolved {
        outcome: CombatOutcome,
    },

    /// Token died and left the board
    TokenKilled {
        player_id: PlayerId,
        token_id: TokenId,
        position: GridPos,
    },

    /// Generator captured for good
    GeneratorDisabled {
        player_id: Option<PlayerId>,
        generator_id: GeneratorId,
        position: GridPos,
        disabled_total: u32,
    },

    /// Player left the rotation
    PlayerEliminated {
        player_id: PlayerId,
    },

    /// Turn passed
    TurnChanged {
        player_id: PlayerId,
        turn_number: u32,
    },

    /// Crystal hold completed
    GameWon {
        winner_id: PlayerId,
        turn_number: u32,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Turn number when the event occurred
    pub turn: u32,

    /// Presentation priority
    pub priority: EventPriority,

    /// Player involved (for tie-breaking)
    pub player_id: Option<PlayerId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(turn: u32, priority: EventPriority, data: GameEventData) -> Self {
        let player_id = match &data {
            GameEventData::TokenDeployed { player_id, .. }
            | GameEventData::TokenMoved { player_id, .. }
            | GameEventData::TokenKilled { player_id, .. }
            | GameEventData::PlayerEliminated { player_id }
            | GameEventData::TurnChanged { player_id, .. } => Some(player_id.clone()),
            GameEventData::GeneratorDisabled { player_id, .. } => player_id.clone(),
            GameEventData::GameWon { winner_id, .. } => Some(winner_id.clone()),
            _ => None,
        };

        Self {
            turn,
            priority,
            player_id,
            data,
        }
    }

    /// Token deployed event.
    pub fn token_deployed(turn: u32, player_id: PlayerId, token_id: TokenId, tier: HealthTier, position: GridPos) -> Self {
        Self::new(
            turn,
            EventPriority::Movement,
            GameEventData::TokenDeployed {
                player_id,
                token_id,
                tier,
                position,
            },
        )
    }

    /// Token moved event.
    pub fn token_moved(turn: u32, player_id: PlayerId, token_id: TokenId, from: GridPos, to: GridPos) -> Self {
        Self::new(
            turn,
            EventPriority::Movement,
            GameEventData::TokenMoved {
                player_id,
                token_id,
                from,
                to,
            },
        )
    }

    /// Mystery event.
    pub fn mystery_triggered(turn: u32, result: MysteryEventResult) -> Self {
        Self::new(turn, EventPriority::Mystery, GameEventData::MysteryTriggered { result })
    }

    /// Combat event.
    pub fn combat_resolved(turn: u32, outcome: CombatOutcome) -> Self {
        Self::new(turn, EventPriority::Combat, GameEventData::CombatResolved { outcome })
    }

    /// Token killed event.
    pub fn token_killed(turn: u32, player_id: PlayerId, token_id: TokenId, position: GridPos) -> Self {
        Self::new(
            turn,
            EventPriority::TokenDeath,
            GameEventData::TokenKilled {
                player_id,
                token_id,
                position,
            },
        )
    }

    /// Generator disabled event.
    pub fn generator_disabled(
        turn: u32,
        player_id: Option<PlayerId>,
        generator_id: GeneratorId,
        position: GridPos,
        disabled_total: u32,
    ) -> Self {
        Self::new(
            turn,
            EventPriority::Capture,
            GameEventData::GeneratorDisabled {
                player_id,
                generator_id,
                position,
                disabled_total,
            },
        )
    }

    /// Player eliminated event.
    pub fn player_eliminated(turn: u32, player_id: PlayerId) -> Self {
        Self::new(turn, EventPriority::TokenDeath, GameEventData::PlayerEliminated { player_id })
    }

    /// Turn changed event.
    pub fn turn_changed(turn: u32, player_id: PlayerId) -> Self {
        Self::new(
            turn,
            EventPriority::Turn,
            GameEventData::TurnChanged {
                player_id,
                turn_number: turn,
            },
        )
    }

    /// Game won event.
    pub fn game_won(turn: u32, winner_id: PlayerId) -> Self {
        Self::new(
            turn,
            EventPriority::Other,
            GameEventData::GameWon {
                winner_id,
                turn_number: turn,
            },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.turn == other.turn
            && self.priority == other.priority
            && self.player_id == other.player_id
            && self.data == other.data
    }
}

impl PartialOrd for GameEvent {
    /// Orders by turn, then priority, then player. Distinct events with the
    /// same key are unordered, so `partial_cmp` agrees with `==`.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let ordering = self
            .turn
            .cmp(&other.turn)
            .then(self.priority.cmp(&other.priority))
            .then(self.player_id.cmp(&other.player_id));

        match ordering {
            std::cmp::Ordering::Equal if self.data != other.data => None,
            ordering => Some(ordering),
        }
    }
}
