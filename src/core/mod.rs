//! Core deterministic primitives.
//!
//! Board coordinates, the seeded random source and state hashing. Nothing
//! here knows about the game rules.

pub mod grid;
pub mod rng;
pub mod hash;

// Re-export core types
pub use grid::GridPos;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
