//! Grid Positions
//!
//! Integer board coordinates and the distance metrics the rules use.
//! Positions serialize as a two-element `[x, y]` array.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Deserialize, Serialize};

/// The eight king-move offsets, in scan order.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// A cell coordinate on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct GridPos {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl GridPos {
    /// Origin cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by (dx, dy).
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance.
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub fn chebyshev(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Straight-line distance.
    #[inline]
    pub fn euclidean(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// True when `other` is one of the eight surrounding cells.
    #[inline]
    pub fn is_adjacent(self, other: Self) -> bool {
        self != other && self.chebyshev(other) <= 1
    }

    /// The eight surrounding positions, unclipped.
    pub fn neighbors(self) -> impl Iterator<Item = GridPos> {
        DIRECTIONS.into_iter().map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<GridPos> for (i32, i32) {
    fn from(pos: GridPos) -> Self {
        (pos.x, pos.y)
    }
}

impl Add for GridPos {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.offset(rhs.x, rhs.y)
    }
}

impl Sub for GridPos {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.offset(-rhs.x, -rhs.y)
    }
}

impl fmt::Debug for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridPos({}, {})", self.x, self.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let a = GridPos::new(0, 0);
        let b = GridPos::new(3, 4);

        assert_eq!(a.manhattan(b), 7);
        assert_eq!(a.chebyshev(b), 4);
        assert!((a.euclidean(b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjacency_excludes_self() {
        let p = GridPos::new(5, 5);
        assert!(!p.is_adjacent(p));
        assert!(p.is_adjacent(GridPos::new(6, 6)));
        assert!(p.is_adjacent(GridPos::new(4, 5)));
        assert!(!p.is_adjacent(GridPos::new(7, 5)));
    }

    #[test]
    fn test_neighbors() {
        let n: Vec<GridPos> = GridPos::new(1, 1).neighbors().collect();
        assert_eq!(n.len(), 8);
        assert!(n.contains(&GridPos::new(0, 0)));
        assert!(n.contains(&GridPos::new(2, 2)));
        assert!(!n.contains(&GridPos::new(1, 1)));
    }

    #[test]
    fn test_serializes_as_pair() {
        let json = serde_json::to_string(&GridPos::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");

        let back: GridPos = serde_json::from_str("[3,7]").unwrap();
        assert_eq!(back, GridPos::new(3, 7));
    }

    #[test]
    fn test_ops() {
        let p = GridPos::new(2, 3) + GridPos::new(1, -1);
        assert_eq!(p, GridPos::new(3, 2));
        assert_eq!(p - GridPos::new(3, 2), GridPos::ORIGIN);
    }
}
