//! State Hashing for Verification
//!
//! Deterministic SHA-256 hashing of game state, used to confirm that a
//! client's copy of a game matches the authority's after a resync and that a
//! replay reproduced the same game.

use sha2::{Digest, Sha256};
use super::grid::GridPos;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for game state.
///
/// Order of updates is part of the hash; callers walk ordered collections.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for game state.
    pub fn for_game_state() -> Self {
        Self::new(b"RACE_CRYSTAL_STATE_V1")
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a grid position.
    #[inline]
    pub fn update_pos(&mut self, pos: GridPos) {
        self.update_i32(pos.x);
        self.update_i32(pos.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with an optional string; `None` and `Some("")` hash differently.
    #[inline]
    pub fn update_opt_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.update_u8(1);
                self.update_str(s);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for game verification.
///
/// Called by `GameState::compute_hash()`; the closure adds the
/// game-specific fields after the turn number and seed.
pub fn compute_state_hash<F>(turn_number: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_game_state();

    hasher.update_u32(turn_number);
    hasher.update_u64(rng_seed);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_game_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_pos(GridPos::new(3, 4));
            hasher.update_str("alice");
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let hash_a = {
            let mut h = StateHasher::new(b"DOMAIN_A");
            h.update_u32(7);
            h.finalize()
        };
        let hash_b = {
            let mut h = StateHasher::new(b"DOMAIN_B");
            h.update_u32(7);
            h.finalize()
        };
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_optional_string_is_tagged() {
        let none = {
            let mut h = StateHasher::new(b"t");
            h.update_opt_str(None);
            h.finalize()
        };
        let empty = {
            let mut h = StateHasher::new(b"t");
            h.update_opt_str(Some(""));
            h.finalize()
        };
        assert_ne!(none, empty);
    }

    #[test]
    fn test_compute_state_hash_includes_header() {
        let a = compute_state_hash(1, 42, |_| {});
        let b = compute_state_hash(2, 42, |_| {});
        let c = compute_state_hash(1, 43, |_| {});
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
