//! Rules Configuration
//!
//! Tunable parameters for board generation and game setup. Defaults are the
//! standard rules; capture thresholds are fixed constants on `Generator` and
//! `Crystal`.

use serde::{Deserialize, Serialize};

use crate::game::board::{Board, BoardError};
use crate::{BOARD_HEIGHT, BOARD_WIDTH, MAX_PLAYERS, MIN_PLAYERS};

/// Board generation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Columns.
    pub width: i32,
    /// Rows.
    pub height: i32,
    /// Mystery squares placed in each quadrant.
    pub mystery_per_quadrant: usize,
    /// Placement attempts per quadrant before giving up.
    pub mystery_max_attempts: u32,
    /// Distance kept between mystery squares and the board edge / centre lines.
    pub mystery_edge_margin: i32,
    /// Boards narrower or shorter than this get no mystery squares.
    pub mystery_min_board_size: i32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            mystery_per_quadrant: 2,
            mystery_max_attempts: 100,
            mystery_edge_margin: 2,
            mystery_min_board_size: 10,
        }
    }
}

impl BoardConfig {
    /// Check the dimensions fit a board.
    pub fn validate(&self) -> Result<(), BoardError> {
        Board::cell_count(self.width, self.height).map(|_| ())
    }
}

/// Full rules configuration for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Board generation.
    pub board: BoardConfig,
    /// Tokens of each health tier a player receives at game start.
    pub tokens_per_tier: u32,
    /// Players required to start.
    pub min_players: usize,
    /// Player cap.
    pub max_players: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            tokens_per_tier: 5,
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
        }
    }
}

impl RulesConfig {
    /// Standard rules on a custom board size. Boards smaller than
    /// `mystery_min_board_size` on either side get no mystery squares.
    pub fn small(width: i32, height: i32) -> Self {
        Self {
            board: BoardConfig {
                width,
                height,
                ..BoardConfig::default()
            },
            ..Self::default()
        }
    }

    /// Total tokens a player starts with.
    pub fn tokens_per_player(&self) -> u32 {
        self.tokens_per_tier * 4
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
