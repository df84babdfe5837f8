//! Board
//!
//! The fixed W×H grid. Cells live in a flat vector indexed `y * width + x`;
//! each cell carries its type and an ordered list of occupant token ids.
//!
//! Layout:
//! - four Start cells at the corners
//! - the Crystal at the centre `(W/2, H/2)`
//! - one Generator per quadrant at `(W/4, H/4)` and its mirrors
//! - Mystery squares scattered per quadrant from the seeded RNG

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::grid::GridPos;
use crate::core::rng::DeterministicRng;
use crate::game::config::BoardConfig;
use crate::game::token::TokenId;

/// What a cell is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// Plain ground.
    Normal,
    /// One of the four capturable generators.
    Generator,
    /// The crystal at the centre.
    Crystal,
    /// Random heal/teleport square.
    Mystery,
    /// A player's home corner.
    Start,
}

impl CellType {
    /// Friendly tokens may share these cells.
    #[inline]
    pub fn allows_stacking(self) -> bool {
        matches!(self, CellType::Generator | CellType::Crystal)
    }
}

/// One board square.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Where the cell is.
    pub position: GridPos,
    /// Its type.
    pub cell_type: CellType,
    /// Token ids standing here, in arrival order.
    pub occupants: Vec<TokenId>,
}

impl Cell {
    /// Create an empty cell.
    pub fn new(position: GridPos, cell_type: CellType) -> Self {
        Self {
            position,
            cell_type,
            occupants: Vec::new(),
        }
    }

    /// Any token here?
    #[inline]
    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    /// First token to arrive, if any.
    #[inline]
    pub fn occupant(&self) -> Option<TokenId> {
        self.occupants.first().copied()
    }

    /// Is this token here?
    #[inline]
    pub fn contains(&self, token_id: TokenId) -> bool {
        self.occupants.contains(&token_id)
    }
}

/// Board structure errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// Width or height not positive.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions {
        /// Columns.
        width: i32,
        /// Rows.
        height: i32,
    },

    /// Cell list does not cover the grid.
    #[error("board expects {expected} cells, got {actual}")]
    SizeMismatch {
        /// width * height
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },

    /// A cell is stored at the wrong index.
    #[error("cell at index {index} reports position {position}")]
    MisplacedCell {
        /// Flat index.
        index: usize,
        /// Position the cell claims.
        position: GridPos,
    },
}

/// Serialized shape of a board, validated on the way in.
#[derive(Deserialize)]
struct BoardRepr {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl TryFrom<BoardRepr> for Board {
    type Error = BoardError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        let expected = Board::cell_count(repr.width, repr.height)?;
        if repr.cells.len() != expected {
            return Err(BoardError::SizeMismatch {
                expected,
                actual: repr.cells.len(),
            });
        }

        for (index, cell) in repr.cells.iter().enumerate() {
            let x = (index as i32) % repr.width;
            let y = (index as i32) / repr.width;
            if cell.position != GridPos::new(x, y) {
                return Err(BoardError::MisplacedCell {
                    index,
                    position: cell.position,
                });
            }
        }

        Ok(Self {
            width: repr.width,
            height: repr.height,
            cells: repr.cells,
        })
    }
}

/// The game board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr")]
pub struct Board {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Board {
    /// Longest side a board may have.
    pub const MAX_SIDE: i32 = 1024;

    /// Cells in a `width` x `height` grid, if both sides are in `1..=MAX_SIDE`.
    pub fn cell_count(width: i32, height: i32) -> Result<usize, BoardError> {
        let invalid = BoardError::InvalidDimensions { width, height };
        if !(1..=Self::MAX_SIDE).contains(&width) || !(1..=Self::MAX_SIDE).contains(&height) {
            return Err(invalid);
        }
        width
            .checked_mul(height)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(invalid)
    }

    /// All-Normal board with nothing placed.
    ///
    /// Sides are clamped to `1..=MAX_SIDE`; use [`BoardConfig::validate`] to
    /// reject bad dimensions instead.
    pub fn empty(width: i32, height: i32) -> Self {
        let width = width.clamp(1, Self::MAX_SIDE);
        let height = height.clamp(1, Self::MAX_SIDE);
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(GridPos::new(x, y), CellType::Normal));
            }
        }
        Self { width, height, cells }
    }

    /// Generate a standard board.
    pub fn generate(config: &BoardConfig, rng: &mut DeterministicRng) -> Self {
        let mut board = Self::empty(config.width, config.height);
        board.place_fixed_cells();
        board.place_mystery_squares(config, rng);
        board
    }

    /// Columns.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Rows.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// All cells in index order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// In bounds?
    #[inline]
    pub fn is_valid_position(&self, pos: GridPos) -> bool {
        self.index(pos.x, pos.y).is_some()
    }

    /// Cell at (x, y), `None` if out of bounds.
    pub fn get_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).and_then(|i| self.cells.get(i))
    }

    /// Cell at a position.
    pub fn get_cell_at(&self, pos: GridPos) -> Option<&Cell> {
        self.get_cell(pos.x, pos.y)
    }

    fn get_cell_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        self.index(pos.x, pos.y).and_then(move |i| self.cells.get_mut(i))
    }

    /// Cell type at a position.
    pub fn cell_type_at(&self, pos: GridPos) -> Option<CellType> {
        self.get_cell_at(pos).map(|c| c.cell_type)
    }

    /// Change a cell's type. Returns false out of bounds.
    pub fn set_cell_type(&mut self, pos: GridPos, cell_type: CellType) -> bool {
        match self.get_cell_mut(pos) {
            Some(cell) => {
                cell.cell_type = cell_type;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Occupancy
    // =========================================================================

    /// Append a token to a cell. No-op if it is already listed.
    pub fn add_occupant(&mut self, pos: GridPos, token_id: TokenId) -> bool {
        match self.get_cell_mut(pos) {
            Some(cell) => {
                if !cell.occupants.contains(&token_id) {
                    cell.occupants.push(token_id);
                }
                true
            }
            None => false,
        }
    }

    /// Remove one token from a cell. Returns whether it was there.
    pub fn remove_occupant(&mut self, pos: GridPos, token_id: TokenId) -> bool {
        match self.get_cell_mut(pos) {
            Some(cell) => {
                let before = cell.occupants.len();
                cell.occupants.retain(|&id| id != token_id);
                cell.occupants.len() != before
            }
            None => false,
        }
    }

    /// Make a token the sole occupant of a cell.
    pub fn set_occupant(&mut self, pos: GridPos, token_id: TokenId) -> bool {
        match self.get_cell_mut(pos) {
            Some(cell) => {
                cell.occupants.clear();
                cell.occupants.push(token_id);
                true
            }
            None => false,
        }
    }

    /// Empty a cell.
    pub fn clear_occupants(&mut self, pos: GridPos) {
        if let Some(cell) = self.get_cell_mut(pos) {
            cell.occupants.clear();
        }
    }

    /// Occupants of a cell (empty out of bounds).
    pub fn occupants_at(&self, pos: GridPos) -> &[TokenId] {
        self.get_cell_at(pos)
            .map(|c| c.occupants.as_slice())
            .unwrap_or(&[])
    }

    /// Is anything standing here?
    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.get_cell_at(pos).map_or(false, Cell::is_occupied)
    }

    // =========================================================================
    // Landmarks
    // =========================================================================

    /// Corner for a player index: (0,0), (W-1,0), (0,H-1), (W-1,H-1), mod 4.
    pub fn get_starting_position(&self, player_index: usize) -> GridPos {
        let (w, h) = (self.width, self.height);
        match player_index % 4 {
            0 => GridPos::new(0, 0),
            1 => GridPos::new(w - 1, 0),
            2 => GridPos::new(0, h - 1),
            _ => GridPos::new(w - 1, h - 1),
        }
    }

    /// The 3×3 deployment block at a player's corner.
    ///
    /// Enumerated column by column, each column scanned top to bottom within
    /// the block. Right-hand corners start at the right edge and move inward.
    pub fn get_deployable_positions(&self, player_index: usize) -> Vec<GridPos> {
        let (w, h) = (self.width, self.height);
        let left: [i32; 3] = [0, 1, 2];
        let right: [i32; 3] = [w - 1, w - 2, w - 3];
        let top: [i32; 3] = [0, 1, 2];
        let bottom: [i32; 3] = [h - 3, h - 2, h - 1];

        let (xs, ys) = match player_index % 4 {
            0 => (left, top),
            1 => (right, top),
            2 => (left, bottom),
            _ => (right, bottom),
        };

        let mut positions = Vec::with_capacity(9);
        for &x in &xs {
            for &y in &ys {
                let pos = GridPos::new(x, y);
                if self.is_valid_position(pos) && !positions.contains(&pos) {
                    positions.push(pos);
                }
            }
        }
        positions
    }

    /// Board centre.
    pub fn get_crystal_position(&self) -> GridPos {
        GridPos::new(self.width / 2, self.height / 2)
    }

    /// One generator per quadrant, in quadrant order TL, TR, BL, BR.
    pub fn get_generator_positions(&self) -> [GridPos; 4] {
        let (w, h) = (self.width, self.height);
        [
            GridPos::new(w / 4, h / 4),
            GridPos::new(w / 2 + w / 4, h / 4),
            GridPos::new(w / 4, h / 2 + h / 4),
            GridPos::new(w / 2 + w / 4, h / 2 + h / 4),
        ]
    }

    /// All mystery squares, in index order.
    pub fn get_mystery_positions(&self) -> Vec<GridPos> {
        self.positions_of(CellType::Mystery)
    }

    /// Every cell of a type, in index order.
    pub fn positions_of(&self, cell_type: CellType) -> Vec<GridPos> {
        self.cells
            .iter()
            .filter(|c| c.cell_type == cell_type)
            .map(|c| c.position)
            .collect()
    }

    fn place_fixed_cells(&mut self) {
        for index in 0..4 {
            let corner = self.get_starting_position(index);
            self.set_cell_type(corner, CellType::Start);
        }

        for pos in self.get_generator_positions() {
            self.set_cell_type(pos, CellType::Generator);
        }

        let crystal = self.get_crystal_position();
        self.set_cell_type(crystal, CellType::Crystal);
    }

    fn place_mystery_squares(&mut self, config: &BoardConfig, rng: &mut DeterministicRng) {
        if self.width < config.mystery_min_board_size || self.height < config.mystery_min_board_size {
            return;
        }

        let m = config.mystery_edge_margin;
        let (mid_x, mid_y) = (self.width / 2, self.height / 2);
        let quadrants = [
            (m, mid_x - m, m, mid_y - m),
            (mid_x + m, self.width - m, m, mid_y - m),
            (m, mid_x - m, mid_y + m, self.height - m),
            (mid_x + m, self.width - m, mid_y + m, self.height - m),
        ];

        for (x_min, x_max, y_min, y_max) in quadrants {
            if x_max < x_min || y_max < y_min {
                continue;
            }
            let mut placed = 0;
            let mut attempts = 0;
            while placed < config.mystery_per_quadrant && attempts < config.mystery_max_attempts {
                attempts += 1;
                let pos = GridPos::new(
                    rng.next_int_range(x_min, x_max),
                    rng.next_int_range(y_min, y_max),
                );
                if self.cell_type_at(pos) == Some(CellType::Normal) {
                    self.set_cell_type(pos, CellType::Mystery);
                    placed += 1;
                }
            }
            debug!("Placed {} mystery squares in quadrant after {} attempts", placed, attempts);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_board(seed: u64) -> Board {
        Board::generate(&BoardConfig::default(), &mut DeterministicRng::new(seed))
    }

    #[test]
    fn test_dimensions_and_flat_layout() {
        let board = standard_board(1);
        assert_eq!(board.width(), 24);
        assert_eq!(board.height(), 24);
        assert_eq!(board.cells().count(), 576);

        let cell = board.get_cell(5, 7).unwrap();
        assert_eq!(cell.position, GridPos::new(5, 7));
    }

    #[test]
    fn test_out_of_bounds_is_none() {
        let board = standard_board(1);
        assert!(board.get_cell(-1, 0).is_none());
        assert!(board.get_cell(24, 0).is_none());
        assert!(board.get_cell(0, 24).is_none());
        assert!(!board.is_valid_position(GridPos::new(24, 24)));
    }

    #[test]
    fn test_special_cells() {
        let board = standard_board(1);

        assert_eq!(board.cell_type_at(GridPos::new(12, 12)), Some(CellType::Crystal));
        for pos in [(6, 6), (18, 6), (6, 18), (18, 18)] {
            assert_eq!(board.cell_type_at(pos.into()), Some(CellType::Generator));
        }
        for pos in [(0, 0), (23, 0), (0, 23), (23, 23)] {
            assert_eq!(board.cell_type_at(pos.into()), Some(CellType::Start));
        }
    }

    #[test]
    fn test_mystery_squares_per_quadrant() {
        let board = standard_board(42);
        let mysteries = board.get_mystery_positions();
        assert_eq!(mysteries.len(), 8);

        for pos in &mysteries {
            let in_x = (2..=10).contains(&pos.x) || (14..=22).contains(&pos.x);
            let in_y = (2..=10).contains(&pos.y) || (14..=22).contains(&pos.y);
            assert!(in_x && in_y, "mystery square {} outside quadrant bands", pos);
        }

        let tl = mysteries.iter().filter(|p| p.x <= 10 && p.y <= 10).count();
        assert_eq!(tl, 2);
    }

    #[test]
    fn test_generation_is_seeded() {
        assert_eq!(standard_board(7), standard_board(7));
        assert_ne!(
            standard_board(7).get_mystery_positions(),
            standard_board(8).get_mystery_positions()
        );
    }

    #[test]
    fn test_small_board_has_no_mystery_squares() {
        let config = BoardConfig {
            width: 8,
            height: 8,
            ..BoardConfig::default()
        };
        let board = Board::generate(&config, &mut DeterministicRng::new(1));
        assert!(board.get_mystery_positions().is_empty());
        assert_eq!(board.cell_type_at(GridPos::new(4, 4)), Some(CellType::Crystal));
    }

    #[test]
    fn test_starting_positions() {
        let board = standard_board(1);
        assert_eq!(board.get_starting_position(0), GridPos::new(0, 0));
        assert_eq!(board.get_starting_position(1), GridPos::new(23, 0));
        assert_eq!(board.get_starting_position(2), GridPos::new(0, 23));
        assert_eq!(board.get_starting_position(3), GridPos::new(23, 23));
        assert_eq!(board.get_starting_position(4), GridPos::new(0, 0));
    }

    #[test]
    fn test_deployable_positions_order() {
        let board = standard_board(1);

        let p0 = board.get_deployable_positions(0);
        assert_eq!(p0.len(), 9);
        assert_eq!(p0[0], GridPos::new(0, 0));
        assert_eq!(p0[1], GridPos::new(0, 1));
        assert_eq!(p0[3], GridPos::new(1, 0));

        let p1 = board.get_deployable_positions(1);
        assert_eq!(p1[0], GridPos::new(23, 0));
        assert_eq!(p1[3], GridPos::new(22, 0));
        assert_eq!(p1[8], GridPos::new(21, 2));

        let p3 = board.get_deployable_positions(3);
        assert_eq!(p3[0], GridPos::new(23, 21));
        assert!(p3.contains(&GridPos::new(23, 23)));
    }

    #[test]
    fn test_occupancy_bookkeeping() {
        let mut board = Board::empty(5, 5);
        let pos = GridPos::new(2, 2);

        assert!(board.add_occupant(pos, 1));
        assert!(board.add_occupant(pos, 2));
        assert!(board.add_occupant(pos, 1));
        assert_eq!(board.occupants_at(pos), &[1, 2]);

        assert!(board.remove_occupant(pos, 1));
        assert!(!board.remove_occupant(pos, 1));
        assert_eq!(board.get_cell_at(pos).unwrap().occupant(), Some(2));

        board.set_occupant(pos, 9);
        assert_eq!(board.occupants_at(pos), &[9]);

        board.clear_occupants(pos);
        assert!(!board.is_occupied(pos));

        assert!(!board.add_occupant(GridPos::new(9, 9), 1));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut board = standard_board(3);
        board.add_occupant(GridPos::new(1, 1), 4);

        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(board, restored);
    }

    #[test]
    fn test_deserialize_rejects_wrong_size() {
        let json = r#"{"width": 2, "height": 2, "cells": [
            {"position": [0, 0], "cell_type": "normal", "occupants": []}
        ]}"#;
        let err = serde_json::from_str::<Board>(json).unwrap_err();
        assert!(err.to_string().contains("expects 4 cells"));
    }

    #[test]
    fn test_deserialize_rejects_oversized_dimensions() {
        let json = r#"{"width":65536,"height":65536,"cells":[]}"#;
        let err = serde_json::from_str::<Board>(json).unwrap_err();
        assert!(err.to_string().contains("invalid board dimensions"));

        assert!(serde_json::from_str::<Board>(r#"{"width":0,"height":5,"cells":[]}"#).is_err());
        assert!(serde_json::from_str::<Board>(r#"{"width":2147483647,"height":2,"cells":[]}"#).is_err());
    }

    #[test]
    fn test_cell_count_bounds() {
        assert_eq!(Board::cell_count(24, 24), Ok(576));
        assert_eq!(Board::cell_count(Board::MAX_SIDE, Board::MAX_SIDE), Ok(1 << 20));
        assert!(Board::cell_count(Board::MAX_SIDE + 1, 1).is_err());
        assert!(Board::cell_count(-3, 4).is_err());
    }

    #[test]
    fn test_empty_clamps_dimensions() {
        let board = Board::empty(100_000, 0);
        assert_eq!(board.width(), Board::MAX_SIDE);
        assert_eq!(board.height(), 1);
        assert_eq!(board.cells().count(), Board::MAX_SIDE as usize);
    }

    #[test]
    fn test_inverted_quadrant_gets_no_mystery_squares() {
        // A margin wider than a quadrant leaves no room to place anything
        let config = BoardConfig {
            width: 12,
            height: 12,
            mystery_edge_margin: 4,
            ..BoardConfig::default()
        };
        let board = Board::generate(&config, &mut DeterministicRng::new(3));
        assert!(board.get_mystery_positions().is_empty());
    }

    #[test]
    fn test_deserialize_rejects_misplaced_cell() {
        let json = r#"{"width": 2, "height": 1, "cells": [
            {"position": [1, 0], "cell_type": "normal", "occupants": []},
            {"position": [0, 0], "cell_type": "normal", "occupants": []}
        ]}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());
    }
}
