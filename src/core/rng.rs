//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. Every random decision the rules
//! make (mystery square placement, mystery effects) is drawn from this
//! generator, so a game replayed from the same seed and the same actions
//! reaches the same state.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic PRNG using Xorshift128+.
///
/// The generator is a plain value: clone it to fork a sequence, serialize it
/// to checkpoint one.
///
/// # Example
///
/// ```
/// use race_crystal::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // All-zero state would emit zeros forever
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, max).
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as u32
    }

    /// Generate a random integer in range [min, max].
    #[inline]
    pub fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let range = (max - min + 1) as u32;
        min + self.next_int(range) as i32
    }

    /// Fair coin flip.
    #[inline]
    pub fn coin_flip(&mut self) -> bool {
        // Top bit; the low bits of xorshift+ are the weakest
        self.next_u64() >> 63 == 1
    }

    /// Raw generator state, folded into the game's state hash.
    pub fn state(&self) -> [u64; 2] {
        self.state
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a game seed from the game id and its players.
///
/// `player_ids` must be passed in a stable order (the session sorts them).
pub fn derive_game_seed(game_id: &[u8; 16], player_ids: &[&str]) -> u64 {
    let mut hasher = Sha256::new();

    hasher.update(b"RACE_CRYSTAL_SEED_V1");
    hasher.update(game_id);

    for pid in player_ids {
        hasher.update((pid.len() as u32).to_le_bytes());
        hasher.update(pid.as_bytes());
    }

    let hash = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);

        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_next_int() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            assert!(rng.next_int(100) < 100);
        }

        assert_eq!(rng.next_int(0), 0);
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_next_int_range_inclusive() {
        let mut rng = DeterministicRng::new(5678);
        let mut saw_min = false;
        let mut saw_max = false;

        for _ in 0..2000 {
            let val = rng.next_int_range(2, 5);
            assert!((2..=5).contains(&val));
            saw_min |= val == 2;
            saw_max |= val == 5;
        }

        assert!(saw_min && saw_max);
        assert_eq!(rng.next_int_range(5, 5), 5);
    }

    #[test]
    fn test_coin_flip_is_balanced() {
        let mut rng = DeterministicRng::new(2024);
        let heads = (0..10_000).filter(|_| rng.coin_flip()).count();
        assert!((4_500..=5_500).contains(&heads), "heads = {}", heads);
    }

    #[test]
    fn test_derive_game_seed() {
        let game_id = [1u8; 16];
        let players = ["alice", "bob"];

        let seed1 = derive_game_seed(&game_id, &players);
        let seed2 = derive_game_seed(&game_id, &players);
        assert_eq!(seed1, seed2);

        let seed3 = derive_game_seed(&[9u8; 16], &players);
        assert_ne!(seed1, seed3);

        // Length prefix keeps ("ab","c") and ("a","bc") apart
        let seed4 = derive_game_seed(&game_id, &["ab", "c"]);
        let seed5 = derive_game_seed(&game_id, &["a", "bc"]);
        assert_ne!(seed4, seed5);
    }

    #[test]
    fn test_clone_forks_sequence() {
        let mut rng = DeterministicRng::new(5555);
        for _ in 0..10 {
            rng.next_u64();
        }

        let mut fork = rng.clone();
        assert_eq!(rng.state(), fork.state());

        let expected: Vec<u64> = (0..5).map(|_| rng.next_u64()).collect();
        let replayed: Vec<u64> = (0..5).map(|_| fork.next_u64()).collect();

        assert_eq!(expected, replayed);
    }

    #[test]
    fn test_serde_preserves_sequence() {
        let mut rng = DeterministicRng::new(77);
        rng.next_u64();

        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: DeterministicRng = serde_json::from_str(&json).unwrap();

        assert_eq!(rng.next_u64(), restored.next_u64());
    }
}
