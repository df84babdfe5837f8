//! Rule violations.

use thiserror::Error;

use crate::core::grid::GridPos;
use crate::game::player::{PlayerColor, PlayerId};
use crate::game::state::{GamePhase, TurnPhase};
use crate::game::token::{HealthTier, TokenId};

/// Why an operation was refused. Refused operations change nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("game is {actual:?}, expected {expected:?}")]
    WrongGamePhase { expected: GamePhase, actual: GamePhase },

    #[error("it is not {player_id}'s turn")]
    NotYourTurn { player_id: PlayerId },

    #[error("cannot {action} during the {phase:?} phase")]
    WrongTurnPhase { action: &'static str, phase: TurnPhase },

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {0} already joined")]
    DuplicatePlayer(PlayerId),

    #[error("color {0:?} already taken")]
    ColorTaken(PlayerColor),

    #[error("game is full ({max} players)")]
    GameFull { max: usize },

    #[error("need at least {need} players, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("token {0} not found")]
    TokenNotFound(TokenId),

    #[error("token {0} belongs to another player")]
    TokenNotOwned(TokenId),

    #[error("token {0} is not deployed")]
    TokenNotDeployed(TokenId),

    #[error("token {0} is dead")]
    TokenDead(TokenId),

    #[error("position {0} is off the board")]
    OutOfBounds(GridPos),

    #[error("token {token_id} cannot reach {destination}")]
    DestinationUnreachable { token_id: TokenId, destination: GridPos },

    #[error("position {0} is occupied")]
    PositionOccupied(GridPos),

    #[error("position {0} is not in your deployment zone")]
    NotDeploymentZone(GridPos),

    #[error("{0} is not a valid health tier (10, 8, 6 or 4)")]
    InvalidHealthTier(u8),

    #[error("no {0} tokens left in reserve")]
    NoReserveToken(HealthTier),

    #[error("cannot attack your own token")]
    OwnTokenAttack,

    #[error("token {defender_id} is not adjacent to token {attacker_id}")]
    NotAdjacent { attacker_id: TokenId, defender_id: TokenId },
}
