//! Players
//!
//! Identity, color/corner assignment and the list of owned token ids.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::game::token::TokenId;

/// Opaque player identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow as `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Player color. The discriminant is the corner index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PlayerColor {
    /// Top-left.
    Cyan = 0,
    /// Top-right.
    Magenta = 1,
    /// Bottom-left.
    Yellow = 2,
    /// Bottom-right.
    Green = 3,
}

impl PlayerColor {
    /// All colors in corner order.
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Cyan,
        PlayerColor::Magenta,
        PlayerColor::Yellow,
        PlayerColor::Green,
    ];

    /// Corner index (0..4).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Color for a corner index, wrapping mod 4.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::Cyan => "Cyan",
            PlayerColor::Magenta => "Magenta",
            PlayerColor::Yellow => "Yellow",
            PlayerColor::Green => "Green",
        }
    }

    /// One-letter board symbol.
    pub fn symbol(self) -> char {
        match self {
            PlayerColor::Cyan => 'c',
            PlayerColor::Magenta => 'm',
            PlayerColor::Yellow => 'y',
            PlayerColor::Green => 'g',
        }
    }
}

/// A participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Color, which also fixes the home corner.
    pub color: PlayerColor,
    /// Tokens this player owns, in creation order.
    pub token_ids: Vec<TokenId>,
    /// Lobby ready flag.
    pub is_ready: bool,
    /// False once eliminated or departed.
    pub is_active: bool,
    /// Optional team tag.
    pub team: Option<String>,
}

impl Player {
    /// Create an active player with no tokens.
    pub fn new(id: PlayerId, name: impl Into<String>, color: PlayerColor) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            token_ids: Vec::new(),
            is_ready: false,
            is_active: true,
            team: None,
        }
    }

    /// Corner index.
    #[inline]
    pub fn corner_index(&self) -> usize {
        self.color.index()
    }

    /// Record ownership; duplicates are ignored.
    pub fn add_token(&mut self, token_id: TokenId) {
        if !self.token_ids.contains(&token_id) {
            self.token_ids.push(token_id);
        }
    }

    /// Drop ownership. Returns whether the token was owned.
    pub fn remove_token(&mut self, token_id: TokenId) -> bool {
        let before = self.token_ids.len();
        self.token_ids.retain(|&id| id != token_id);
        self.token_ids.len() != before
    }

    /// Owns this token?
    #[inline]
    pub fn has_token(&self, token_id: TokenId) -> bool {
        self.token_ids.contains(&token_id)
    }

    /// Token count.
    #[inline]
    pub fn token_count(&self) -> usize {
        self.token_ids.len()
    }

    /// Mark as out of the game.
    pub fn eliminate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_ownership() {
        let mut player = Player::new("p1".into(), "Alice", PlayerColor::Cyan);
        player.add_token(3);
        player.add_token(3);
        player.add_token(4);
        assert_eq!(player.token_ids, vec![3, 4]);
        assert!(player.has_token(4));

        assert!(player.remove_token(3));
        assert!(!player.remove_token(3));
        assert_eq!(player.token_count(), 1);
    }

    #[test]
    fn test_eliminate() {
        let mut player = Player::new("p1".into(), "Alice", PlayerColor::Green);
        assert!(player.is_active);
        player.eliminate();
        assert!(!player.is_active);
        assert_eq!(player.corner_index(), 3);
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(PlayerColor::from_index(1), PlayerColor::Magenta);
        assert_eq!(PlayerColor::from_index(6), PlayerColor::Yellow);
        assert_eq!(PlayerColor::Yellow.symbol(), 'y');
    }

    #[test]
    fn test_player_id_is_transparent() {
        let json = serde_json::to_string(&PlayerId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        assert_ne!(PlayerId::generate(), PlayerId::generate());
    }
}
