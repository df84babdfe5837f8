//! Tokens
//!
//! A token is a single playing piece. Its maximum health is one of four
//! tiers; lighter tiers move further, current health drives attack power.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::core::grid::GridPos;
use crate::game::player::PlayerId;

/// Token identifier, unique within a game.
pub type TokenId = u32;

/// Maximum-health tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum HealthTier {
    /// 10 health, moves 1.
    Ten = 10,
    /// 8 health, moves 1.
    Eight = 8,
    /// 6 health, moves 2.
    Six = 6,
    /// 4 health, moves 2.
    Four = 4,
}

impl HealthTier {
    /// All tiers, heaviest first (creation order).
    pub const ALL: [HealthTier; 4] = [
        HealthTier::Ten,
        HealthTier::Eight,
        HealthTier::Six,
        HealthTier::Four,
    ];

    /// Health value.
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Cells a token of this tier may move per turn.
    #[inline]
    pub fn movement_range(self) -> u32 {
        match self {
            HealthTier::Six | HealthTier::Four => 2,
            HealthTier::Ten | HealthTier::Eight => 1,
        }
    }

    /// Parse a health value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            10 => Some(HealthTier::Ten),
            8 => Some(HealthTier::Eight),
            6 => Some(HealthTier::Six),
            4 => Some(HealthTier::Four),
            _ => None,
        }
    }
}

impl TryFrom<u8> for HealthTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        HealthTier::from_value(value).ok_or_else(|| format!("invalid health tier {}", value))
    }
}

impl From<HealthTier> for u8 {
    fn from(tier: HealthTier) -> Self {
        tier.value()
    }
}

impl fmt::Display for HealthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hp", self.value())
    }
}

/// A playing piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique id.
    pub id: TokenId,
    /// Owning player.
    pub player_id: PlayerId,
    /// Current health, `0..=max_health`.
    pub health: u8,
    /// Tier the token was created at.
    pub max_health: HealthTier,
    /// Board position (the owner's corner while in reserve).
    pub position: GridPos,
    /// False once health reaches zero.
    pub is_alive: bool,
    /// False while in reserve.
    pub is_deployed: bool,
}

impl Token {
    /// Create a reserve token at full health.
    pub fn new(id: TokenId, player_id: PlayerId, tier: HealthTier, position: GridPos) -> Self {
        Self {
            id,
            player_id,
            health: tier.value(),
            max_health: tier,
            position,
            is_alive: true,
            is_deployed: false,
        }
    }

    /// Cells this token may move per turn.
    #[inline]
    pub fn movement_range(&self) -> u32 {
        self.max_health.movement_range()
    }

    /// Damage this token deals: half its current health, rounded down.
    #[inline]
    pub fn attack_power(&self) -> u8 {
        self.health / 2
    }

    /// Apply damage. Returns true if this killed the token.
    pub fn take_damage(&mut self, amount: u8) -> bool {
        let was_alive = self.is_alive;
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.is_alive = false;
        }
        was_alive && !self.is_alive
    }

    /// Restore to full health.
    pub fn heal_to_full(&mut self) {
        if self.is_alive {
            self.health = self.max_health.value();
        }
    }

    /// Set position.
    #[inline]
    pub fn move_to(&mut self, position: GridPos) {
        self.position = position;
    }

    /// On the board and alive.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_alive && self.is_deployed
    }

    /// In reserve and alive.
    #[inline]
    pub fn is_in_reserve(&self) -> bool {
        self.is_alive && !self.is_deployed
    }

    /// Manhattan distance to a position.
    #[inline]
    pub fn distance_to(&self, pos: GridPos) -> u32 {
        self.position.manhattan(pos)
    }

    /// One of the eight cells around this token (its own cell excluded).
    #[inline]
    pub fn is_adjacent_to(&self, pos: GridPos) -> bool {
        self.position.is_adjacent(pos)
    }

    /// Same owner?
    #[inline]
    pub fn is_friendly_to(&self, other: &Token) -> bool {
        self.player_id == other.player_id
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token(tier: HealthTier) -> Token {
        Token::new(1, PlayerId::from("p1"), tier, GridPos::new(5, 5))
    }

    #[test]
    fn test_movement_range_by_tier() {
        assert_eq!(token(HealthTier::Ten).movement_range(), 1);
        assert_eq!(token(HealthTier::Eight).movement_range(), 1);
        assert_eq!(token(HealthTier::Six).movement_range(), 2);
        assert_eq!(token(HealthTier::Four).movement_range(), 2);
    }

    #[test]
    fn test_attack_power_tracks_current_health() {
        let mut t = token(HealthTier::Ten);
        assert_eq!(t.attack_power(), 5);
        t.take_damage(3);
        assert_eq!(t.health, 7);
        assert_eq!(t.attack_power(), 3);
    }

    #[test]
    fn test_take_damage_clamps_and_kills() {
        let mut t = token(HealthTier::Four);
        assert!(t.take_damage(10));
        assert_eq!(t.health, 0);
        assert!(!t.is_alive);
        // Already dead
        assert!(!t.take_damage(1));
    }

    #[test]
    fn test_heal_to_full() {
        let mut t = token(HealthTier::Eight);
        t.take_damage(5);
        t.heal_to_full();
        assert_eq!(t.health, 8);
    }

    #[test]
    fn test_adjacency() {
        let t = token(HealthTier::Ten);
        assert!(t.is_adjacent_to(GridPos::new(4, 4)));
        assert!(t.is_adjacent_to(GridPos::new(6, 5)));
        assert!(!t.is_adjacent_to(GridPos::new(5, 5)));
        assert!(!t.is_adjacent_to(GridPos::new(7, 5)));
    }

    #[test]
    fn test_reserve_flags() {
        let mut t = token(HealthTier::Six);
        assert!(t.is_in_reserve());
        assert!(!t.is_active());
        t.is_deployed = true;
        assert!(t.is_active());
    }

    #[test]
    fn test_health_tier_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&HealthTier::Six).unwrap(), "6");
        assert_eq!(serde_json::from_str::<HealthTier>("8").unwrap(), HealthTier::Eight);
        assert!(serde_json::from_str::<HealthTier>("7").is_err());
    }

    #[test]
    fn test_token_serde_roundtrip() {
        let t = token(HealthTier::Four);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"position\":[5,5]"));
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
