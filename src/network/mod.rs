//! Network Layer
//!
//! Message codec and session hosting for remote play.
//! This layer is **non-deterministic** (ids, clocks); all rules run through `game/`.

pub mod protocol;
pub mod session;

pub use protocol::{
    ClientMessage, ServerMessage, ServerError, ErrorCode, ProtocolError,
    encode_snapshot, decode_snapshot, frame_message, parse_frame,
};
pub use session::{GameSession, SessionId, SessionState, SessionConfig, SessionError, SessionManager, Outbound, Recipient};
