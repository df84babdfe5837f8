//! Game Logic Module
//!
//! The rules of Race to the Crystal. Deterministic given the seed.
//!
//! ## Module Structure
//!
//! - `board`: grid, cell types, occupancy, deployment zones
//! - `token`: health tiers and token state
//! - `player`: player identity, color, owned tokens
//! - `config`: rules and board configuration
//! - `movement`: reachable cells and pathfinding
//! - `combat`: attack resolution
//! - `capture`: per-cell token tallies shared by generators and the crystal
//! - `generator` / `crystal`: capture mechanics
//! - `mystery`: mystery square effects
//! - `events`: records returned from mutations
//! - `state`: the game orchestrator
//! - `actions`: validate / execute player actions
//! - `observation`: text and structured views for AI players

pub mod board;
pub mod token;
pub mod player;
pub mod config;
pub mod movement;
pub mod combat;
pub mod capture;
pub mod generator;
pub mod crystal;
pub mod mystery;
pub mod events;
pub mod violation;
pub mod state;
pub mod actions;
pub mod observation;

// Re-export key types
pub use actions::{execute_action, validate_action, Action, ActionData, ActionResult, ValidationResult};
pub use board::{Board, BoardError, Cell, CellType};
pub use config::{BoardConfig, RulesConfig};
pub use crystal::Crystal;
pub use events::{EventPriority, GameEvent, GameEventData};
pub use generator::{Generator, GeneratorId};
pub use player::{Player, PlayerColor, PlayerId};
pub use state::{GamePhase, GameState, SnapshotError, TurnPhase, TurnResult};
pub use token::{HealthTier, Token, TokenId};
pub use violation::RuleViolation;
