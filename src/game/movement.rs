//! Movement System
//!
//! Stateless movement rules over the board and the token map.
//!
//! Tokens move like a chess king, up to their movement range, and may route
//! around obstacles. Passability is asymmetric:
//! - a cell holding any live enemy token is a wall
//! - a cell holding only friendly tokens is passable only on
//!   Generator and Crystal cells (where stacking is legal)
//! - an empty cell is always passable

use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::grid::{GridPos, DIRECTIONS};
use crate::game::board::{Board, Cell};
use crate::game::player::PlayerId;
use crate::game::token::{Token, TokenId};

/// Token lookup used by the rules.
pub type TokenMap = BTreeMap<TokenId, Token>;

/// Can a token owned by `mover_owner` enter or cross this cell?
pub fn cell_passable(cell: &Cell, mover_owner: &PlayerId, tokens: &TokenMap) -> bool {
    let mut has_friendly = false;

    for id in &cell.occupants {
        let Some(occupant) = tokens.get(id) else {
            continue;
        };
        if !occupant.is_alive {
            continue;
        }
        if &occupant.player_id != mover_owner {
            return false;
        }
        has_friendly = true;
    }

    !has_friendly || cell.cell_type.allows_stacking()
}

/// Every cell the token can reach this turn (its own cell excluded).
pub fn get_valid_moves(token: &Token, board: &Board, tokens: &TokenMap) -> BTreeSet<GridPos> {
    get_valid_moves_within(token, board, tokens, token.movement_range())
}

/// Reachable cells using an explicit range instead of the token's own.
pub fn get_valid_moves_within(
    token: &Token,
    board: &Board,
    tokens: &TokenMap,
    max_range: u32,
) -> BTreeSet<GridPos> {
    let mut reachable = BTreeSet::new();
    if !token.is_alive || max_range == 0 {
        return reachable;
    }

    let start = token.position;
    let mut visited = BTreeSet::from([start]);
    let mut queue = VecDeque::from([(start, 0u32)]);

    while let Some((pos, depth)) = queue.pop_front() {
        if depth >= max_range {
            continue;
        }

        for (dx, dy) in DIRECTIONS {
            let next = pos.offset(dx, dy);
            if visited.contains(&next) {
                continue;
            }
            let Some(cell) = board.get_cell_at(next) else {
                continue;
            };
            visited.insert(next);

            if !cell_passable(cell, &token.player_id, tokens) {
                continue;
            }

            reachable.insert(next);
            queue.push_back((next, depth + 1));
        }
    }

    #[cfg(feature = "debug-tracing")]
    trace!(token = token.id, from = %start, count = reachable.len(), "valid moves");

    reachable
}

/// Can the token legally move to `destination` this turn?
pub fn is_valid_move(token: &Token, destination: GridPos, board: &Board, tokens: &TokenMap) -> bool {
    get_valid_moves(token, board, tokens).contains(&destination)
}

/// Shortest 8-directional path from `start` to `end`, both included.
///
/// Intermediate cells must be empty; the destination may be occupied. At most
/// `max_distance` steps are taken. Returns `Some(vec![start])` when the two
/// coincide.
pub fn find_path(start: GridPos, end: GridPos, board: &Board, max_distance: u32) -> Option<Vec<GridPos>> {
    if start == end {
        return Some(vec![start]);
    }

    let mut parents: BTreeMap<GridPos, GridPos> = BTreeMap::new();
    let mut visited = BTreeSet::from([start]);
    let mut queue = VecDeque::from([(start, 0u32)]);

    while let Some((pos, steps)) = queue.pop_front() {
        if steps >= max_distance {
            continue;
        }

        for (dx, dy) in DIRECTIONS {
            let next = pos.offset(dx, dy);
            if visited.contains(&next) || !board.is_valid_position(next) {
                continue;
            }

            if next == end {
                parents.insert(next, pos);
                return Some(rebuild_path(&parents, start, end));
            }

            if board.is_occupied(next) {
                continue;
            }

            visited.insert(next);
            parents.insert(next, pos);
            queue.push_back((next, steps + 1));
        }
    }

    None
}

fn rebuild_path(parents: &BTreeMap<GridPos, GridPos>, start: GridPos, end: GridPos) -> Vec<GridPos> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match parents.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Manhattan distance.
#[inline]
pub fn get_distance(a: GridPos, b: GridPos) -> u32 {
    a.manhattan(b)
}

/// Straight-line distance.
#[inline]
pub fn get_euclidean_distance(a: GridPos, b: GridPos) -> f64 {
    a.euclidean(b)
}

/// Eight-neighbour adjacency.
#[inline]
pub fn is_adjacent(a: GridPos, b: GridPos) -> bool {
    a.is_adjacent(b)
}

/// In-bounds neighbours of a position.
pub fn get_adjacent_positions(pos: GridPos, board: &Board) -> Vec<GridPos> {
    pos.neighbors().filter(|p| board.is_valid_position(*p)).collect()
}

// =============================================================================
// TESTS
// =============================================================================
