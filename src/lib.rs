//! # Race to the Crystal
//!
//! Deterministic rules engine for Race to the Crystal, a 2-4 player
//! turn-based board game on a 24x24 grid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   RACE TO THE CRYSTAL                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                │
//! │  ├── grid.rs       - Board coordinates and distances         │
//! │  ├── rng.rs        - Deterministic Xorshift128+ PRNG         │
//! │  └── hash.rs       - State hashing for sync verification     │
//! │                                                              │
//! │  game/             - Game rules (deterministic)              │
//! │  ├── board.rs      - Grid, cells, deployment zones           │
//! │  ├── token.rs      - Health tiers and token state            │
//! │  ├── movement.rs   - Reachability and pathfinding            │
//! │  ├── combat.rs     - Attack resolution                       │
//! │  ├── generator.rs  - Generator capture                       │
//! │  ├── crystal.rs    - Crystal capture (win condition)         │
//! │  ├── mystery.rs    - Mystery square effects                  │
//! │  ├── state.rs      - Game orchestrator                       │
//! │  ├── actions.rs    - Validate / execute player actions       │
//! │  └── observation.rs- Text views for AI players               │
//! │                                                              │
//! │  network/          - Hosting (non-deterministic)             │
//! │  ├── protocol.rs   - Message types, snapshots, framing       │
//! │  └── session.rs    - Game session management                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from the seeded Xorshift128+ held in the game state
//!
//! Given the same seed and the same actions, two games reach identical
//! state hashes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::grid::GridPos;
pub use core::rng::DeterministicRng;
pub use game::actions::{execute_action, validate_action, Action, ActionResult};
pub use game::state::{GamePhase, GameState, TurnPhase};
pub use game::player::{PlayerColor, PlayerId};
pub use game::token::{HealthTier, TokenId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Standard board width (cells)
pub const BOARD_WIDTH: i32 = 24;

/// Standard board height (cells)
pub const BOARD_HEIGHT: i32 = 24;

/// Players needed to start a game
pub const MIN_PLAYERS: usize = 2;

/// Seats per game (one per corner)
pub const MAX_PLAYERS: usize = 4;
