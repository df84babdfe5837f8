//! Game State
//!
//! The orchestrator. Owns the board, players, tokens, generators and crystal
//! for one game, and drives setup, deployment, movement bookkeeping and the
//! end-of-turn capture evaluation.
//!
//! `GameState` does not check move legality; callers validate first (see
//! `game::actions`). Mutations that fail because an id is unknown simply
//! return `None`/`false` and leave the state untouched.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::grid::GridPos;
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::DeterministicRng;
use crate::game::board::{Board, CellType};
use crate::game::config::RulesConfig;
use crate::game::crystal::Crystal;
use crate::game::events::GameEvent;
use crate::game::generator::{self, Generator, GeneratorId};
use crate::game::movement::TokenMap;
use crate::game::mystery::{self, MysteryEventResult};
use crate::game::player::{Player, PlayerColor, PlayerId};
use crate::game::token::{HealthTier, Token, TokenId};
use crate::game::violation::RuleViolation;

// =============================================================================
// PHASES
// =============================================================================

/// Game lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Players joining.
    Setup,
    /// Turns in progress.
    Playing,
    /// A winner has been decided.
    Ended,
}

/// Step within a player's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// One move or deploy, or pass.
    Movement,
    /// One attack, or end the turn.
    Action,
    /// Only ending the turn remains.
    EndTurn,
}

// =============================================================================
// RESULTS
// =============================================================================

/// Outcome of the end-of-turn capture evaluation.
#[derive(Clone, Debug, Default)]
pub struct CaptureReport {
    /// Generators disabled by this evaluation.
    pub newly_disabled: Vec<GeneratorId>,
    /// Crystal winner, if the hold completed.
    pub winner: Option<PlayerId>,
    /// Events produced.
    pub events: Vec<GameEvent>,
}

/// Result of ending a turn.
#[derive(Clone, Debug, Default)]
pub struct TurnResult {
    /// Events produced (capture changes, win, turn hand-off).
    pub events: Vec<GameEvent>,
    /// Generators disabled at this turn end.
    pub newly_disabled: Vec<GeneratorId>,
    /// Whether the game is over.
    pub game_ended: bool,
    /// Winner (if ended).
    pub winner: Option<PlayerId>,
}

/// Snapshot decode / consistency failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Malformed JSON or wrong shape.
    #[error("invalid game snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed but self-contradictory.
    #[error("inconsistent game snapshot: {0}")]
    Inconsistent(String),
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game.
///
/// Uses BTreeMap for deterministic iteration; `turn_order` keeps players in
/// join order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Rules in force.
    pub config: RulesConfig,

    /// The grid.
    pub board: Board,

    /// Players by id.
    pub players: BTreeMap<PlayerId, Player>,

    /// Player ids in join order.
    pub turn_order: Vec<PlayerId>,

    /// All tokens ever created, by id (dead ones stay, marked dead).
    #[serde(with = "token_list")]
    pub tokens: TokenMap,

    /// Generators, one per quadrant.
    pub generators: Vec<Generator>,

    /// The crystal.
    pub crystal: Option<Crystal>,

    /// Whose turn it is.
    pub current_turn_player_id: Option<PlayerId>,

    /// Completed rotations + 1.
    pub turn_number: u32,

    /// Lifecycle phase.
    pub phase: GamePhase,

    /// Step within the current turn.
    pub turn_phase: TurnPhase,

    /// Winner once ended.
    pub winner_id: Option<PlayerId>,

    /// Next token id to hand out.
    pub next_token_id: TokenId,

    /// Seed the game was created from.
    pub rng_seed: u64,

    /// Live random source; serialized so a resumed game continues the sequence.
    pub rng: DeterministicRng,
}

impl GameState {
    /// Create a game in Setup with a freshly generated board.
    pub fn new(config: RulesConfig, rng_seed: u64) -> Self {
        Self::with_rng(config, rng_seed, DeterministicRng::new(rng_seed))
    }

    /// Create a game drawing all randomness from `rng`.
    pub fn with_rng(config: RulesConfig, rng_seed: u64, mut rng: DeterministicRng) -> Self {
        let board = Board::generate(&config.board, &mut rng);
        let generators = generator::create_generators(&board.get_generator_positions());
        let crystal = Some(Crystal::new(board.get_crystal_position()));

        Self {
            config,
            board,
            players: BTreeMap::new(),
            turn_order: Vec::new(),
            tokens: TokenMap::new(),
            generators,
            crystal,
            current_turn_player_id: None,
            turn_number: 0,
            phase: GamePhase::Setup,
            turn_phase: TurnPhase::Movement,
            winner_id: None,
            next_token_id: 0,
            rng_seed,
            rng,
        }
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// First color nobody has picked.
    pub fn next_free_color(&self) -> Option<PlayerColor> {
        PlayerColor::ALL
            .into_iter()
            .find(|c| self.players.values().all(|p| p.color != *c))
    }

    /// Join a player during Setup.
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        name: impl Into<String>,
        color: PlayerColor,
    ) -> Result<&Player, RuleViolation> {
        self.require_phase(GamePhase::Setup)?;

        if self.players.contains_key(&player_id) {
            return Err(RuleViolation::DuplicatePlayer(player_id));
        }
        if self.players.len() >= self.config.max_players {
            return Err(RuleViolation::GameFull {
                max: self.config.max_players,
            });
        }
        if self.players.values().any(|p| p.color == color) {
            return Err(RuleViolation::ColorTaken(color));
        }

        debug!("Player {} joined as {}", player_id, color.name());
        self.turn_order.push(player_id.clone());
        let player = self
            .players
            .entry(player_id.clone())
            .or_insert_with(|| Player::new(player_id, name, color));
        Ok(player)
    }

    /// Remove a player before the game starts.
    ///
    /// Once the game is running use [`GameState::eliminate_player`].
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Result<Player, RuleViolation> {
        self.require_phase(GamePhase::Setup)?;

        let player = self
            .players
            .remove(player_id)
            .ok_or_else(|| RuleViolation::PlayerNotFound(player_id.clone()))?;
        self.turn_order.retain(|id| id != player_id);
        Ok(player)
    }

    /// Knock a player out mid-game: their tokens leave the board and the
    /// rotation skips them. The last active player left wins.
    pub fn eliminate_player(&mut self, player_id: &PlayerId) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return events;
        }

        let token_ids = match self.players.get_mut(player_id) {
            Some(player) if player.is_active => {
                player.eliminate();
                player.token_ids.clone()
            }
            _ => return events,
        };

        for token_id in token_ids {
            let on_board = self.tokens.get(&token_id).map_or(false, Token::is_active);
            if on_board {
                events.extend(self.remove_token(token_id));
            } else if let Some(token) = self.tokens.get_mut(&token_id) {
                token.health = 0;
                token.is_alive = false;
            }
        }

        info!("Player {} eliminated", player_id);
        events.push(GameEvent::player_eliminated(self.turn_number, player_id.clone()));

        let remaining: Vec<PlayerId> = self.active_player_ids();
        if remaining.len() == 1 {
            let winner = remaining[0].clone();
            events.push(GameEvent::game_won(self.turn_number, winner.clone()));
            self.set_winner(winner);
        } else if self.current_turn_player_id.as_ref() == Some(player_id) {
            events.extend(self.advance_turn());
        }

        events
    }

    /// Look up a player.
    pub fn get_player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.get(player_id)
    }

    /// Player whose turn it is.
    pub fn get_current_player(&self) -> Option<&Player> {
        self.current_turn_player_id
            .as_ref()
            .and_then(|id| self.players.get(id))
    }

    /// Is it this player's turn?
    pub fn is_player_turn(&self, player_id: &PlayerId) -> bool {
        self.current_turn_player_id.as_ref() == Some(player_id)
    }

    /// Corner index of a player.
    pub fn player_index(&self, player_id: &PlayerId) -> Option<usize> {
        self.players.get(player_id).map(Player::corner_index)
    }

    /// Active players in join order.
    pub fn active_player_ids(&self) -> Vec<PlayerId> {
        self.turn_order
            .iter()
            .filter(|id| self.players.get(*id).map_or(false, |p| p.is_active))
            .cloned()
            .collect()
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Give a player their starting reserve: `tokens_per_tier` of each tier,
    /// heaviest first, all parked at the corner and undeployed.
    pub fn create_tokens_for_player(&mut self, player_id: &PlayerId) -> Result<Vec<TokenId>, RuleViolation> {
        let corner = match self.players.get(player_id) {
            Some(player) => self.board.get_starting_position(player.corner_index()),
            None => return Err(RuleViolation::PlayerNotFound(player_id.clone())),
        };

        let mut created = Vec::with_capacity(self.config.tokens_per_player() as usize);
        for tier in HealthTier::ALL {
            for _ in 0..self.config.tokens_per_tier {
                let id = self.next_token_id;
                self.next_token_id += 1;
                self.tokens.insert(id, Token::new(id, player_id.clone(), tier, corner));
                created.push(id);
            }
        }

        if let Some(player) = self.players.get_mut(player_id) {
            for &id in &created {
                player.add_token(id);
            }
        }

        Ok(created)
    }

    /// Look up a token.
    pub fn get_token(&self, token_id: TokenId) -> Option<&Token> {
        self.tokens.get(&token_id)
    }

    /// A player's living undeployed tokens, in creation order.
    pub fn get_reserve_tokens(&self, player_id: &PlayerId) -> Vec<&Token> {
        self.owned_tokens(player_id)
            .filter(|t| t.is_in_reserve())
            .collect()
    }

    /// Reserve size per tier (every tier present, possibly zero).
    pub fn get_reserve_token_counts(&self, player_id: &PlayerId) -> BTreeMap<HealthTier, u32> {
        let mut counts: BTreeMap<HealthTier, u32> = HealthTier::ALL.into_iter().map(|t| (t, 0)).collect();
        for token in self.get_reserve_tokens(player_id) {
            *counts.entry(token.max_health).or_insert(0) += 1;
        }
        counts
    }

    /// A player's living tokens on the board.
    pub fn get_player_tokens(&self, player_id: &PlayerId) -> Vec<&Token> {
        self.owned_tokens(player_id)
            .filter(|t| t.is_active())
            .collect()
    }

    fn owned_tokens<'a>(&'a self, player_id: &PlayerId) -> impl Iterator<Item = &'a Token> + 'a {
        let ids: &[TokenId] = self
            .players
            .get(player_id)
            .map(|p| p.token_ids.as_slice())
            .unwrap_or(&[]);
        ids.iter().filter_map(move |id| self.tokens.get(id))
    }

    /// Living tokens on a cell, in arrival order.
    pub fn get_tokens_at_position(&self, position: GridPos) -> Vec<&Token> {
        self.board
            .occupants_at(position)
            .iter()
            .filter_map(|id| self.tokens.get(id))
            .filter(|t| t.is_alive)
            .collect()
    }

    /// Move a token from reserve onto the board.
    ///
    /// Takes the first reserve token of the requested tier. Off-board
    /// positions are refused; any other legality is the caller's concern.
    pub fn deploy_token(&mut self, player_id: &PlayerId, health_value: u8, position: GridPos) -> Option<TokenId> {
        if !self.board.is_valid_position(position) {
            return None;
        }
        let tier = HealthTier::from_value(health_value)?;
        let token_id = self
            .get_reserve_tokens(player_id)
            .into_iter()
            .find(|t| t.max_health == tier)
            .map(|t| t.id)?;

        let token = self.tokens.get_mut(&token_id)?;
        token.move_to(position);
        token.is_deployed = true;
        self.board.add_occupant(position, token_id);

        debug!("Player {} deployed token {} ({}) at {}", player_id, token_id, tier, position);
        Some(token_id)
    }

    /// Relocate a token, keeping board occupancy in step.
    ///
    /// Fails for unknown or dead tokens and off-board positions; legality
    /// is not checked.
    pub fn move_token(&mut self, token_id: TokenId, new_position: GridPos) -> Option<GameEvent> {
        if !self.board.is_valid_position(new_position) {
            return None;
        }
        let token = self.tokens.get_mut(&token_id).filter(|t| t.is_alive)?;
        let old_position = token.position;
        token.move_to(new_position);
        let owner = token.player_id.clone();

        self.board.remove_occupant(old_position, token_id);
        self.board.add_occupant(new_position, token_id);

        Some(GameEvent::token_moved(self.turn_number, owner, token_id, old_position, new_position))
    }

    /// Take a token off the board for good.
    pub fn remove_token(&mut self, token_id: TokenId) -> Option<GameEvent> {
        let token = self.tokens.get_mut(&token_id)?;
        token.health = 0;
        token.is_alive = false;
        let position = token.position;
        let owner = token.player_id.clone();

        self.board.remove_occupant(position, token_id);
        if let Some(player) = self.players.get_mut(&owner) {
            player.remove_token(token_id);
        }

        debug!("Token {} of {} removed at {}", token_id, owner, position);
        Some(GameEvent::token_killed(self.turn_number, owner, token_id, position))
    }

    /// Fire the mystery square under a token, keeping occupancy in step.
    ///
    /// `None` if the token is unknown, dead, or not on a mystery square.
    pub fn trigger_mystery(&mut self, token_id: TokenId) -> Option<MysteryEventResult> {
        let token = self.tokens.get_mut(&token_id)?;
        if !mystery::can_trigger(token) || self.board.cell_type_at(token.position) != Some(CellType::Mystery) {
            return None;
        }
        let player_index = self.players.get(&token.player_id).map(Player::corner_index)?;

        let result = mystery::trigger_mystery_event(token, &self.board, player_index, &mut self.rng);
        if result.old_position != result.new_position {
            self.board.remove_occupant(result.old_position, token_id);
            self.board.add_occupant(result.new_position, token_id);
        }

        debug!("Mystery square: {}", result);
        Some(result)
    }

    // =========================================================================
    // Turn flow
    // =========================================================================

    /// Leave Setup: hand out reserves and give the first joiner the turn.
    pub fn start_game(&mut self) -> Result<(), RuleViolation> {
        self.require_phase(GamePhase::Setup)?;

        if self.players.len() < self.config.min_players {
            return Err(RuleViolation::NotEnoughPlayers {
                have: self.players.len(),
                need: self.config.min_players,
            });
        }

        for player_id in self.turn_order.clone() {
            self.create_tokens_for_player(&player_id)?;
        }

        self.current_turn_player_id = self.turn_order.first().cloned();
        self.phase = GamePhase::Playing;
        self.turn_phase = TurnPhase::Movement;
        self.turn_number = 1;

        info!(
            "Game started: {} players, {} tokens, seed {}",
            self.players.len(),
            self.tokens.len(),
            self.rng_seed
        );
        Ok(())
    }

    /// Finish the current player's turn.
    ///
    /// Evaluates generators and the crystal first; a completed crystal hold
    /// ends the game. Otherwise play passes to the next active player in
    /// join order, and the turn number increases when the rotation wraps.
    pub fn end_turn(&mut self) -> TurnResult {
        if self.phase != GamePhase::Playing || self.current_turn_player_id.is_none() {
            return TurnResult {
                game_ended: self.phase == GamePhase::Ended,
                winner: self.winner_id.clone(),
                ..TurnResult::default()
            };
        }

        let report = self.update_generators_and_crystal();
        let mut events = report.events;

        if let Some(winner) = report.winner {
            events.push(GameEvent::game_won(self.turn_number, winner.clone()));
            self.set_winner(winner.clone());
            return TurnResult {
                events,
                newly_disabled: report.newly_disabled,
                game_ended: true,
                winner: Some(winner),
            };
        }

        events.extend(self.advance_turn());

        TurnResult {
            events,
            newly_disabled: report.newly_disabled,
            game_ended: false,
            winner: None,
        }
    }

    fn advance_turn(&mut self) -> Option<GameEvent> {
        let len = self.turn_order.len();
        let start = self
            .current_turn_player_id
            .as_ref()
            .and_then(|cur| self.turn_order.iter().position(|id| id == cur));

        // Unknown current player behaves as if sitting before the first seat
        let (base, offset_start) = match start {
            Some(i) => (i, 1),
            None => (0, 0),
        };

        for offset in offset_start..offset_start + len {
            let seat = base + offset;
            let candidate = &self.turn_order[seat % len];
            if self.players.get(candidate).map_or(false, |p| p.is_active) {
                if seat >= len || start.is_none() {
                    self.turn_number += 1;
                }
                let next = candidate.clone();
                self.current_turn_player_id = Some(next.clone());
                self.turn_phase = TurnPhase::Movement;
                debug!("Turn {}: {} to play", self.turn_number, next);
                return Some(GameEvent::turn_changed(self.turn_number, next));
            }
        }

        None
    }

    /// Living deployed tokens grouped by cell, as `(token_id, owner)` in id order.
    pub fn tokens_by_position(&self) -> BTreeMap<GridPos, Vec<(TokenId, PlayerId)>> {
        let mut map: BTreeMap<GridPos, Vec<(TokenId, PlayerId)>> = BTreeMap::new();
        for token in self.tokens.values().filter(|t| t.is_active()) {
            map.entry(token.position)
                .or_default()
                .push((token.id, token.player_id.clone()));
        }
        map
    }

    /// Run the end-of-turn capture evaluation for every generator and the crystal.
    pub fn update_generators_and_crystal(&mut self) -> CaptureReport {
        let by_position = self.tokens_by_position();
        let mut report = CaptureReport {
            newly_disabled: generator::update_all_generators(&mut self.generators, &by_position),
            ..CaptureReport::default()
        };

        let disabled = self.disabled_generator_count();
        for &id in &report.newly_disabled {
            if let Some(gen) = self.generators.iter().find(|g| g.id == id) {
                info!("Generator {} disabled by {:?} ({} disabled)", id, gen.capturing_player_id, disabled);
                report.events.push(GameEvent::generator_disabled(
                    self.turn_number,
                    gen.capturing_player_id.clone(),
                    id,
                    gen.position,
                    disabled,
                ));
            }
        }

        if let Some(crystal) = self.crystal.as_mut() {
            let on_crystal = by_position
                .get(&crystal.position)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            report.winner = crystal.update_capture_status(on_crystal, disabled);
        }

        report
    }

    /// Disabled generator count.
    pub fn disabled_generator_count(&self) -> u32 {
        generator::count_disabled_generators(&self.generators)
    }

    /// Tokens currently needed on the crystal.
    pub fn crystal_tokens_required(&self) -> u32 {
        let disabled = self.disabled_generator_count();
        self.crystal
            .as_ref()
            .map_or(Crystal::BASE_TOKENS_REQUIRED, |c| c.get_tokens_required(disabled))
    }

    /// Winner, if decided.
    pub fn check_win_condition(&self) -> Option<&PlayerId> {
        self.winner_id.as_ref()
    }

    /// Declare the winner and end the game.
    pub fn set_winner(&mut self, player_id: PlayerId) {
        info!("Player {} wins on turn {}", player_id, self.turn_number);
        self.winner_id = Some(player_id);
        self.phase = GamePhase::Ended;
    }

    /// Is the game over?
    pub fn is_ended(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    pub(crate) fn require_phase(&self, expected: GamePhase) -> Result<(), RuleViolation> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RuleViolation::WrongGamePhase {
                expected,
                actual: self.phase,
            })
        }
    }

    // =========================================================================
    // Verification & persistence
    // =========================================================================

    /// Hash of the rules-relevant state for sync verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.turn_number, self.rng_seed, |hasher| {
            hasher.update_u8(self.phase as u8);
            hasher.update_u8(self.turn_phase as u8);
            hasher.update_opt_str(self.current_turn_player_id.as_ref().map(PlayerId::as_str));
            hasher.update_opt_str(self.winner_id.as_ref().map(PlayerId::as_str));

            for player_id in &self.turn_order {
                hasher.update_str(player_id.as_str());
                if let Some(player) = self.players.get(player_id) {
                    hasher.update_u8(player.color as u8);
                    hasher.update_bool(player.is_active);
                }
            }

            for (id, token) in &self.tokens {
                hasher.update_u32(*id);
                hasher.update_str(token.player_id.as_str());
                hasher.update_u8(token.health);
                hasher.update_u8(token.max_health.value());
                hasher.update_pos(token.position);
                hasher.update_bool(token.is_alive);
                hasher.update_bool(token.is_deployed);
            }

            for gen in &self.generators {
                hasher.update_u32(gen.id);
                hasher.update_opt_str(gen.capturing_player_id.as_ref().map(PlayerId::as_str));
                hasher.update_u32(gen.turns_held);
                hasher.update_bool(gen.is_disabled);
            }

            if let Some(crystal) = &self.crystal {
                hasher.update_opt_str(crystal.holding_player_id.as_ref().map(PlayerId::as_str));
                hasher.update_u32(crystal.turns_held);
            }

            for pos in self.board.get_mystery_positions() {
                hasher.update_pos(pos);
            }

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Check that board occupancy and token positions agree.
    pub fn verify_consistency(&self) -> Result<(), SnapshotError> {
        for token in self.tokens.values().filter(|t| t.is_active()) {
            let listed = self
                .board
                .get_cell_at(token.position)
                .map_or(false, |c| c.contains(token.id));
            if !listed {
                return Err(SnapshotError::Inconsistent(format!(
                    "token {} is not listed on its cell {}",
                    token.id, token.position
                )));
            }
        }

        for cell in self.board.cells() {
            for id in &cell.occupants {
                match self.tokens.get(id) {
                    Some(t) if t.is_active() && t.position == cell.position => {}
                    _ => {
                        return Err(SnapshotError::Inconsistent(format!(
                            "cell {} lists token {} that is not there",
                            cell.position, id
                        )))
                    }
                }
            }
        }

        if let Some(current) = &self.current_turn_player_id {
            if !self.players.contains_key(current) {
                return Err(SnapshotError::Inconsistent(format!("current player {} unknown", current)));
            }
        }

        Ok(())
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, SnapshotError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild from a JSON value, checking consistency.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        let state: Self = serde_json::from_value(value)?;
        state.verify_consistency()?;
        Ok(state)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild from a JSON string, checking consistency.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let state: Self = serde_json::from_str(json)?;
        state.verify_consistency()?;
        Ok(state)
    }
}

/// Tokens travel as a list; integer map keys do not survive buffered
/// (internally tagged) JSON decoding.
mod token_list {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::game::movement::TokenMap;
    use crate::game::token::Token;

    pub fn serialize<S: Serializer>(tokens: &TokenMap, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(tokens.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TokenMap, D::Error> {
        let list = Vec::<Token>::deserialize(deserializer)?;
        let count = list.len();
        let map: TokenMap = list.into_iter().map(|t| (t.id, t)).collect();
        if map.len() != count {
            return Err(serde::de::Error::custom("duplicate token id"));
        }
        Ok(map)
    }
}

// =============================================================================
// TESTS
// =============================================================================
