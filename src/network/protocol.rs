//! Protocol Messages
//!
//! Wire format between a game host and its clients. Messages are JSON for
//! readability; full game snapshots can also travel as bincode. Over a byte
//! stream every payload is framed as `[4-byte big-endian length][payload]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::actions::{Action, ActionResult};
use crate::game::events::GameEvent;
use crate::game::player::{PlayerColor, PlayerId};
use crate::game::state::{GameState, SnapshotError};

/// Largest payload a frame may announce.
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// Length prefix width.
pub const FRAME_HEADER_SIZE: usize = 4;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a seat in the game.
    Join {
        player_name: String,
        /// Preferred color; the first free one otherwise.
        color: Option<PlayerColor>,
    },

    /// Ask the host to start the game.
    StartGame,

    /// Play a move, attack, deployment or end of turn.
    Action { action: Action },

    /// Request the full state (for reconnection).
    SyncRequest,

    /// Ping for latency measurement.
    Ping { timestamp: u64 },

    /// Player is leaving the game.
    Leave,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Seat confirmed.
    Joined { player_id: PlayerId, color: PlayerColor },

    /// Someone else sat down.
    PlayerJoined {
        player_id: PlayerId,
        player_name: String,
        color: PlayerColor,
    },

    /// Someone left or was eliminated.
    PlayerLeft { player_id: PlayerId },

    /// Game is under way.
    GameStarted {
        turn_order: Vec<PlayerId>,
        first_player_id: PlayerId,
    },

    /// Complete state with its hash for sync verification.
    FullState {
        state: Box<GameState>,
        /// Hex-encoded state hash.
        state_hash: String,
    },

    /// Outcome of an action.
    ActionResult {
        player_id: PlayerId,
        result: ActionResult,
    },

    /// Game event notification.
    Event { event: GameEvent },

    /// Play passed to another player.
    TurnChange { player_id: PlayerId, turn_number: u32 },

    /// Game over.
    GameWon { winner_id: PlayerId, turn_number: u32 },

    /// An action was refused.
    InvalidAction { action_type: String, reason: String },

    /// Error message.
    Error(ServerError),

    /// Pong response.
    Pong { timestamp: u64, server_time: i64 },
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Build an error payload.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed message.
    InvalidMessage,
    /// Sender has no seat.
    NotInGame,
    /// Sender already has a seat.
    AlreadyInGame,
    /// All seats taken or the game already started.
    GameFull,
    /// The game has not started.
    GameNotStarted,
    /// Rules refused the request.
    RuleViolation,
    /// Internal error.
    InternalError,
}

/// Codec errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON encode/decode failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Bincode encode/decode failed.
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    /// Snapshot decoded but is not a valid game.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Frame announces more than [`MAX_FRAME_SIZE`] bytes.
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_SIZE} byte limit")]
    FrameTooLarge(usize),

    /// Stream ended inside a frame.
    #[error("stream ended mid-frame")]
    TruncatedFrame,

    /// Underlying I/O failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Full-state message for a game.
    pub fn full_state(state: &GameState) -> Self {
        ServerMessage::FullState {
            state_hash: hex::encode(state.compute_hash()),
            state: Box::new(state.clone()),
        }
    }

    /// Error message.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error(ServerError::new(code, message))
    }
}

/// Binary snapshot of a game.
pub fn encode_snapshot(state: &GameState) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(state)?)
}

/// Restore a binary snapshot, checking it is self-consistent.
pub fn decode_snapshot(bytes: &[u8]) -> Result<GameState, ProtocolError> {
    let state: GameState = bincode::deserialize(bytes)?;
    state.verify_consistency()?;
    Ok(state)
}

// =============================================================================
// FRAMING
// =============================================================================

/// Prefix a payload with its big-endian length.
pub fn frame_message(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if payload.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(payload.len()));
    }
    let mut framed = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Split one complete frame off the front of a buffer.
///
/// Returns `Ok(None)` until the whole frame has arrived, otherwise the
/// payload and the unconsumed remainder.
pub fn parse_frame(buf: &[u8]) -> Result<Option<(&[u8], &[u8])>, ProtocolError> {
    if buf.len() < FRAME_HEADER_SIZE {
        return Ok(None);
    }
    let (header, rest) = buf.split_at(FRAME_HEADER_SIZE);
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(len));
    }
    if rest.len() < len {
        return Ok(None);
    }
    Ok(Some(rest.split_at(len)))
}

/// Write one framed payload.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&frame_message(payload)?).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed payload. `Ok(None)` on a clean end of stream.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_SIZE];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::TruncatedFrame
        } else {
            ProtocolError::Io(e)
        }
    })?;
    Ok(Some(payload))
}
