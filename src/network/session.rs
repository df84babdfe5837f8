//! Game Session Management
//!
//! Hosts games for remote players: seats players in a lobby, starts the game
//! with a seed derived from the session id and its players, and turns client
//! messages into rule calls and outbound server messages. Transport is the
//! host's concern; sessions only hand back who should receive what.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::core::rng::derive_game_seed;
use crate::game::actions::{self, Action};
use crate::game::config::RulesConfig;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::player::{PlayerColor, PlayerId};
use crate::game::state::GameState;
use crate::game::violation::RuleViolation;
use crate::network::protocol::{ClientMessage, ErrorCode, ServerError, ServerMessage};

/// Unique session identifier.
pub type SessionId = [u8; 16];

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Seating players.
    Lobby,
    /// Game in progress.
    Playing,
    /// Game decided.
    Ended,
    /// Everyone left.
    Closed,
}

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Rules for the hosted game.
    pub rules: RulesConfig,
    /// Start automatically once every seat is taken.
    pub auto_start: bool,
    /// Fixed seed instead of the derived one (replays, tests).
    pub seed_override: Option<u64>,
    /// Capacity of each player's outbound channel.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            auto_start: false,
            seed_override: None,
            channel_capacity: 64,
        }
    }
}

/// Who a message is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Only this player.
    Player(PlayerId),
    /// Every seated player.
    All,
}

/// A message waiting to be delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    /// Target.
    pub to: Recipient,
    /// Payload.
    pub message: ServerMessage,
}

impl Outbound {
    /// Message for one player.
    pub fn to_player(player_id: &PlayerId, message: ServerMessage) -> Self {
        Self {
            to: Recipient::Player(player_id.clone()),
            message,
        }
    }

    /// Message for everyone.
    pub fn broadcast(message: ServerMessage) -> Self {
        Self {
            to: Recipient::All,
            message,
        }
    }
}

/// A seated player.
#[derive(Debug)]
pub struct Seat {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Display name.
    pub name: String,
    /// Chosen color.
    pub color: PlayerColor,
    /// Message channel to this player, once attached.
    pub sender: Option<mpsc::Sender<ServerMessage>>,
    /// Player has left the game.
    pub has_left: bool,
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// No such session.
    #[error("Session not found")]
    SessionNotFound,

    /// All seats taken.
    #[error("Session is full")]
    SessionFull,

    /// Color already picked.
    #[error("Color {0:?} is taken")]
    ColorTaken(PlayerColor),

    /// Player has no seat here.
    #[error("Player {0} is not in this session")]
    NotInSession(PlayerId),

    /// Player is already seated.
    #[error("Already in session")]
    AlreadyInSession,

    /// Seating is closed.
    #[error("Game in progress")]
    GameInProgress,

    /// Nothing to play yet.
    #[error("Game not started")]
    GameNotStarted,

    /// Too few seats filled to start.
    #[error("Need at least {need} players, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    /// The rules refused a request.
    #[error(transparent)]
    Rules(#[from] RuleViolation),
}

impl SessionError {
    /// Wire form of the error.
    pub fn to_server_error(&self) -> ServerError {
        let code = match self {
            SessionError::SessionNotFound | SessionError::NotInSession(_) => ErrorCode::NotInGame,
            SessionError::SessionFull | SessionError::GameInProgress => ErrorCode::GameFull,
            SessionError::AlreadyInSession => ErrorCode::AlreadyInGame,
            SessionError::GameNotStarted | SessionError::NotEnoughPlayers { .. } => ErrorCode::GameNotStarted,
            SessionError::ColorTaken(_) | SessionError::Rules(_) => ErrorCode::RuleViolation,
        };
        ServerError::new(code, self.to_string())
    }
}

// =============================================================================
// GAME SESSION
// =============================================================================

/// One hosted game.
pub struct GameSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// Current state.
    pub state: SessionState,
    /// Session configuration.
    pub config: SessionConfig,
    /// Seats in join order.
    seats: Vec<Seat>,
    /// Rules engine (once started).
    game: Option<GameState>,
    /// When the session was created.
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// Create an empty lobby.
    pub fn new(id: SessionId, config: SessionConfig) -> Self {
        Self {
            id,
            state: SessionState::Lobby,
            config,
            seats: Vec::new(),
            game: None,
            created_at: Utc::now(),
        }
    }

    /// Hex form of the id, for logs and clients.
    pub fn id_hex(&self) -> String {
        hex::encode(self.id)
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The running game, if started.
    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// Seated players in join order.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Seated player count.
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// Is this player seated here?
    pub fn has_player(&self, player_id: &PlayerId) -> bool {
        self.seats.iter().any(|s| &s.player_id == player_id)
    }

    /// Hex-encoded hash of the game state.
    pub fn state_hash(&self) -> Option<String> {
        self.game.as_ref().map(|g| hex::encode(g.compute_hash()))
    }

    /// Seat a new player. Returns their id and color plus the announcements.
    pub fn join(
        &mut self,
        name: impl Into<String>,
        color: Option<PlayerColor>,
    ) -> Result<(PlayerId, Vec<Outbound>), SessionError> {
        if self.state != SessionState::Lobby {
            return Err(SessionError::GameInProgress);
        }
        if self.seats.len() >= self.config.rules.max_players {
            return Err(SessionError::SessionFull);
        }

        let color = match color {
            Some(c) if self.seats.iter().any(|s| s.color == c) => return Err(SessionError::ColorTaken(c)),
            Some(c) => c,
            None => PlayerColor::ALL
                .into_iter()
                .find(|c| self.seats.iter().all(|s| s.color != *c))
                .ok_or(SessionError::SessionFull)?,
        };

        let player_id = PlayerId::generate();
        let name = name.into();
        debug!("Session {}: {} joined as {}", self.id_hex(), name, color.name());

        let mut out = vec![
            Outbound::to_player(
                &player_id,
                ServerMessage::Joined {
                    player_id: player_id.clone(),
                    color,
                },
            ),
            Outbound::broadcast(ServerMessage::PlayerJoined {
                player_id: player_id.clone(),
                player_name: name.clone(),
                color,
            }),
        ];

        self.seats.push(Seat {
            player_id: player_id.clone(),
            name,
            color,
            sender: None,
            has_left: false,
        });

        if self.config.auto_start && self.seats.len() == self.config.rules.max_players {
            out.extend(self.start()?);
        }

        Ok((player_id, out))
    }

    /// Attach the channel messages for a player are delivered on.
    pub fn attach(&mut self, player_id: &PlayerId, sender: mpsc::Sender<ServerMessage>) -> Result<(), SessionError> {
        let seat = self
            .seats
            .iter_mut()
            .find(|s| &s.player_id == player_id)
            .ok_or_else(|| SessionError::NotInSession(player_id.clone()))?;
        seat.sender = Some(sender);
        Ok(())
    }

    /// Start the game with everyone seated.
    pub fn start(&mut self) -> Result<Vec<Outbound>, SessionError> {
        if self.state != SessionState::Lobby {
            return Err(SessionError::GameInProgress);
        }
        let need = self.config.rules.min_players;
        if self.seats.len() < need {
            return Err(SessionError::NotEnoughPlayers {
                have: self.seats.len(),
                need,
            });
        }

        let seed = self.config.seed_override.unwrap_or_else(|| {
            let mut ids: Vec<&str> = self.seats.iter().map(|s| s.player_id.as_str()).collect();
            ids.sort_unstable();
            derive_game_seed(&self.id, &ids)
        });

        let mut game = GameState::new(self.config.rules.clone(), seed);
        for seat in &self.seats {
            game.add_player(seat.player_id.clone(), seat.name.clone(), seat.color)?;
        }
        game.start_game()?;

        info!(
            "Session {} started: {} players, seed {}",
            self.id_hex(),
            self.seats.len(),
            seed
        );

        let first_player_id = game
            .current_turn_player_id
            .clone()
            .ok_or(SessionError::GameNotStarted)?;
        let out = vec![
            Outbound::broadcast(ServerMessage::GameStarted {
                turn_order: game.turn_order.clone(),
                first_player_id,
            }),
            Outbound::broadcast(ServerMessage::full_state(&game)),
        ];

        self.game = Some(game);
        self.state = SessionState::Playing;
        Ok(out)
    }

    /// Route one client message from a seated player.
    pub fn handle_message(&mut self, player_id: &PlayerId, message: ClientMessage) -> Result<Vec<Outbound>, SessionError> {
        if !self.has_player(player_id) {
            return Err(SessionError::NotInSession(player_id.clone()));
        }

        match message {
            ClientMessage::Join { .. } => Err(SessionError::AlreadyInSession),
            ClientMessage::StartGame => self.start(),
            ClientMessage::Action { action } => self.apply_action(player_id, &action),
            ClientMessage::SyncRequest => {
                let game = self.game.as_ref().ok_or(SessionError::GameNotStarted)?;
                Ok(vec![Outbound::to_player(player_id, ServerMessage::full_state(game))])
            }
            ClientMessage::Ping { timestamp } => Ok(vec![Outbound::to_player(
                player_id,
                ServerMessage::Pong {
                    timestamp,
                    server_time: Utc::now().timestamp_millis(),
                },
            )]),
            ClientMessage::Leave => Ok(self.leave(player_id)),
        }
    }

    /// Validate and play an action. Refusals come back as `InvalidAction`.
    pub fn apply_action(&mut self, player_id: &PlayerId, action: &Action) -> Result<Vec<Outbound>, SessionError> {
        let game = self.game.as_mut().ok_or(SessionError::GameNotStarted)?;

        if let Err(violation) = actions::validate_action(action, game, player_id) {
            warn!("Session {}: rejected {} from {}: {}", hex::encode(self.id), action.verb(), player_id, violation);
            return Ok(vec![Outbound::to_player(
                player_id,
                ServerMessage::InvalidAction {
                    action_type: action.verb().to_string(),
                    reason: violation.to_string(),
                },
            )]);
        }

        let result = actions::execute_action(action, game, player_id);
        let events = result.events.clone();

        let mut out = vec![Outbound::broadcast(ServerMessage::ActionResult {
            player_id: player_id.clone(),
            result,
        })];
        out.extend(events.into_iter().map(event_message).map(Outbound::broadcast));

        if game.is_ended() {
            info!("Session {} ended on turn {}", hex::encode(self.id), game.turn_number);
            self.state = SessionState::Ended;
        }
        Ok(out)
    }

    /// Remove a player. In the lobby the seat frees up; in play the player
    /// is eliminated.
    pub fn leave(&mut self, player_id: &PlayerId) -> Vec<Outbound> {
        let Some(index) = self.seats.iter().position(|s| &s.player_id == player_id) else {
            return Vec::new();
        };

        let mut out = vec![Outbound::broadcast(ServerMessage::PlayerLeft {
            player_id: player_id.clone(),
        })];

        match (self.state, self.game.as_mut()) {
            (SessionState::Playing, Some(game)) => {
                let events = game.eliminate_player(player_id);
                out.extend(events.into_iter().map(event_message).map(Outbound::broadcast));
                if game.is_ended() {
                    self.state = SessionState::Ended;
                }
                self.vacate(index);
            }
            (SessionState::Lobby, _) => {
                self.seats.remove(index);
                if self.seats.is_empty() {
                    self.state = SessionState::Closed;
                }
            }
            _ => self.vacate(index),
        }

        if self.state == SessionState::Ended && self.seats.iter().all(|s| s.has_left) {
            info!("Session {} closed", self.id_hex());
            self.state = SessionState::Closed;
        }

        info!("Session {}: player {} left", self.id_hex(), player_id);
        out
    }

    fn vacate(&mut self, index: usize) {
        if let Some(seat) = self.seats.get_mut(index) {
            seat.sender = None;
            seat.has_left = true;
        }
    }

    /// Push messages down the attached channels.
    pub async fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound { to, message } in outbound {
            for seat in &self.seats {
                let wanted = match &to {
                    Recipient::All => true,
                    Recipient::Player(id) => id == &seat.player_id,
                };
                if let (true, Some(sender)) = (wanted, &seat.sender) {
                    if sender.send(message.clone()).await.is_err() {
                        debug!("Session {}: channel to {} closed", self.id_hex(), seat.player_id);
                    }
                }
            }
        }
    }
}

/// Server message for a game event.
fn event_message(event: GameEvent) -> ServerMessage {
    match event.data {
        GameEventData::TurnChanged { player_id, turn_number } => ServerMessage::TurnChange { player_id, turn_number },
        GameEventData::GameWon { winner_id, turn_number } => ServerMessage::GameWon { winner_id, turn_number },
        _ => ServerMessage::Event { event },
    }
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Registry of all hosted sessions. Each session sits behind its own lock.
pub struct SessionManager {
    /// Defaults for new sessions.
    config: SessionConfig,
    /// Active sessions.
    sessions: RwLock<BTreeMap<SessionId, Arc<Mutex<GameSession>>>>,
    /// Player to session mapping.
    player_sessions: RwLock<BTreeMap<PlayerId, SessionId>>,
}

impl SessionManager {
    /// Create a registry using `config` for new sessions.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(BTreeMap::new()),
            player_sessions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a session with the default configuration.
    pub async fn create_session(&self) -> SessionId {
        self.create_session_with(self.config.clone()).await
    }

    /// Create a session with its own configuration.
    #[instrument(skip(self, config))]
    pub async fn create_session_with(&self, config: SessionConfig) -> SessionId {
        let id = uuid::Uuid::new_v4().into_bytes();
        let session = GameSession::new(id, config);
        info!("Created session {}", session.id_hex());

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(Mutex::new(session)));

        id
    }

    /// Get a session by ID.
    pub async fn get_session(&self, id: &SessionId) -> Option<Arc<Mutex<GameSession>>> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Get the session a player is seated in.
    pub async fn get_player_session(&self, player_id: &PlayerId) -> Option<Arc<Mutex<GameSession>>> {
        let session_id = {
            let player_sessions = self.player_sessions.read().await;
            *player_sessions.get(player_id)?
        };
        self.get_session(&session_id).await
    }

    /// Seat a player in a session and remember where they sit.
    #[instrument(skip(self, name), fields(session = %hex::encode(session_id)))]
    pub async fn join_session(
        &self,
        session_id: &SessionId,
        name: &str,
        color: Option<PlayerColor>,
    ) -> Result<(PlayerId, Vec<Outbound>), SessionError> {
        let session = self.get_session(session_id).await.ok_or(SessionError::SessionNotFound)?;
        let (player_id, out) = session.lock().await.join(name, color)?;

        let mut player_sessions = self.player_sessions.write().await;
        player_sessions.insert(player_id.clone(), *session_id);

        Ok((player_id, out))
    }

    /// Route a client message from a seated player.
    #[instrument(skip(self, message))]
    pub async fn handle_message(
        &self,
        player_id: &PlayerId,
        message: ClientMessage,
    ) -> Result<Vec<Outbound>, SessionError> {
        let session = self
            .get_player_session(player_id)
            .await
            .ok_or_else(|| SessionError::NotInSession(player_id.clone()))?;

        let leaving = matches!(message, ClientMessage::Leave);
        let out = session.lock().await.handle_message(player_id, message)?;

        if leaving {
            self.unregister_player(player_id).await;
        }
        Ok(out)
    }

    /// Forget a player's session mapping.
    pub async fn unregister_player(&self, player_id: &PlayerId) {
        let mut player_sessions = self.player_sessions.write().await;
        player_sessions.remove(player_id);
    }

    /// Remove a session and its player mappings.
    pub async fn remove_session(&self, id: &SessionId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        drop(sessions);

        let mut player_sessions = self.player_sessions.write().await;
        player_sessions.retain(|_, session_id| session_id != id);
    }

    /// Get active session count.
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Drop closed sessions.
    pub async fn cleanup(&self) {
        let mut sessions = self.sessions.write().await;
        let mut to_remove = Vec::new();

        for (id, session) in sessions.iter() {
            if session.lock().await.state == SessionState::Closed {
                to_remove.push(*id);
            }
        }

        for id in &to_remove {
            sessions.remove(id);
        }
        drop(sessions);

        if !to_remove.is_empty() {
            debug!("Cleaned up {} closed sessions", to_remove.len());
            let mut player_sessions = self.player_sessions.write().await;
            player_sessions.retain(|_, session_id| !to_remove.contains(session_id));
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
