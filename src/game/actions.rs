//! Actions
//!
//! Two-phase action API for human, AI and network players: validate an
//! action against the current state without touching it, then execute it.
//! `execute_action` always validates first, so a refused action leaves the
//! state exactly as it was.
//!
//! Turn-phase contract enforced here:
//! - Movement: one move or one deploy (or end the turn)
//! - Action: one attack (or end the turn)
//! - EndTurn: only ending the turn remains

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::grid::GridPos;
use crate::game::board::CellType;
use crate::game::combat::{self, CombatOutcome};
use crate::game::events::GameEvent;
use crate::game::generator::GeneratorId;
use crate::game::movement;
use crate::game::mystery::{MysteryEffect, MysteryEventResult};
use crate::game::player::PlayerId;
use crate::game::state::{GamePhase, GameState, TurnPhase};
use crate::game::token::{HealthTier, TokenId};
use crate::game::violation::RuleViolation;

/// Something a player wants to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Move a deployed token.
    Move {
        token_id: TokenId,
        destination: GridPos,
    },
    /// Attack an adjacent enemy token.
    Attack {
        attacker_id: TokenId,
        defender_id: TokenId,
    },
    /// Bring a reserve token of the given tier onto the board.
    Deploy {
        health_value: u8,
        position: GridPos,
    },
    /// Pass play to the next player.
    EndTurn,
}

impl Action {
    /// Short verb for messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Attack { .. } => "attack",
            Action::Deploy { .. } => "deploy",
            Action::EndTurn => "end turn",
        }
    }
}

/// Validation verdict in message form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the action may be executed.
    pub is_valid: bool,
    /// Confirmation or the reason for refusal.
    pub message: String,
}

impl ValidationResult {
    /// Build from a validation outcome.
    pub fn from_check(action: &Action, check: Result<(), RuleViolation>) -> Self {
        match check {
            Ok(()) => Self {
                is_valid: true,
                message: format!("{} is valid", capitalize(action.verb())),
            },
            Err(violation) => Self {
                is_valid: false,
                message: format!("Cannot {}: {}", action.verb(), violation),
            },
        }
    }
}

/// Per-kind execution details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionData {
    /// A token moved (and maybe hit a mystery square).
    Moved {
        token_id: TokenId,
        old_position: GridPos,
        new_position: GridPos,
        mystery: Option<MysteryEventResult>,
    },
    /// An attack resolved.
    Attacked {
        outcome: CombatOutcome,
    },
    /// A token came out of reserve.
    Deployed {
        token_id: TokenId,
        health_value: u8,
        position: GridPos,
        tokens_remaining: u32,
    },
    /// Play passed on (or the game ended).
    TurnEnded {
        turn_number: u32,
        next_player_id: Option<PlayerId>,
        generators_disabled: Vec<GeneratorId>,
        winner_id: Option<PlayerId>,
    },
}

/// What executing an action did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action ran.
    pub success: bool,
    /// Human-readable account.
    pub message: String,
    /// Structured details on success.
    pub data: Option<ActionData>,
    /// Events to present, in occurrence order.
    pub events: Vec<GameEvent>,
}

impl ActionResult {
    fn refused(action: &Action, violation: &RuleViolation) -> Self {
        Self {
            success: false,
            message: format!("Cannot {}: {}", action.verb(), violation),
            data: None,
            events: Vec::new(),
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Check an action without changing anything.
pub fn validate_action(action: &Action, state: &GameState, player_id: &PlayerId) -> Result<(), RuleViolation> {
    state.require_phase(GamePhase::Playing)?;

    if !state.is_player_turn(player_id) {
        return Err(RuleViolation::NotYourTurn {
            player_id: player_id.clone(),
        });
    }

    match action {
        Action::Move { token_id, destination } => validate_move(state, player_id, *token_id, *destination),
        Action::Attack { attacker_id, defender_id } => validate_attack(state, player_id, *attacker_id, *defender_id),
        Action::Deploy { health_value, position } => validate_deploy(state, player_id, *health_value, *position),
        // Passing is always allowed on your own turn
        Action::EndTurn => Ok(()),
    }
}

/// [`validate_action`] as a message.
pub fn check_action(action: &Action, state: &GameState, player_id: &PlayerId) -> ValidationResult {
    ValidationResult::from_check(action, validate_action(action, state, player_id))
}

fn require_turn_phase(state: &GameState, action: &'static str, phase: TurnPhase) -> Result<(), RuleViolation> {
    if state.turn_phase == phase {
        Ok(())
    } else {
        Err(RuleViolation::WrongTurnPhase {
            action,
            phase: state.turn_phase,
        })
    }
}

fn validate_move(
    state: &GameState,
    player_id: &PlayerId,
    token_id: TokenId,
    destination: GridPos,
) -> Result<(), RuleViolation> {
    require_turn_phase(state, "move", TurnPhase::Movement)?;

    let token = state.get_token(token_id).ok_or(RuleViolation::TokenNotFound(token_id))?;
    if &token.player_id != player_id {
        return Err(RuleViolation::TokenNotOwned(token_id));
    }
    if !token.is_deployed {
        return Err(RuleViolation::TokenNotDeployed(token_id));
    }
    if !token.is_alive {
        return Err(RuleViolation::TokenDead(token_id));
    }
    if !movement::is_valid_move(token, destination, &state.board, &state.tokens) {
        return Err(RuleViolation::DestinationUnreachable { token_id, destination });
    }

    Ok(())
}

fn validate_attack(
    state: &GameState,
    player_id: &PlayerId,
    attacker_id: TokenId,
    defender_id: TokenId,
) -> Result<(), RuleViolation> {
    require_turn_phase(state, "attack", TurnPhase::Action)?;

    let attacker = state.get_token(attacker_id).ok_or(RuleViolation::TokenNotFound(attacker_id))?;
    if &attacker.player_id != player_id {
        return Err(RuleViolation::TokenNotOwned(attacker_id));
    }
    if !attacker.is_deployed {
        return Err(RuleViolation::TokenNotDeployed(attacker_id));
    }
    if !attacker.is_alive {
        return Err(RuleViolation::TokenDead(attacker_id));
    }

    let defender = state.get_token(defender_id).ok_or(RuleViolation::TokenNotFound(defender_id))?;
    if &defender.player_id == player_id {
        return Err(RuleViolation::OwnTokenAttack);
    }
    if !defender.is_deployed {
        return Err(RuleViolation::TokenNotDeployed(defender_id));
    }
    if !defender.is_alive {
        return Err(RuleViolation::TokenDead(defender_id));
    }
    if !combat::can_attack(attacker, defender) {
        return Err(RuleViolation::NotAdjacent { attacker_id, defender_id });
    }

    Ok(())
}

fn validate_deploy(
    state: &GameState,
    player_id: &PlayerId,
    health_value: u8,
    position: GridPos,
) -> Result<(), RuleViolation> {
    require_turn_phase(state, "deploy", TurnPhase::Movement)?;

    let tier = HealthTier::from_value(health_value).ok_or(RuleViolation::InvalidHealthTier(health_value))?;

    let in_reserve = state
        .get_reserve_token_counts(player_id)
        .get(&tier)
        .copied()
        .unwrap_or(0);
    if in_reserve == 0 {
        return Err(RuleViolation::NoReserveToken(tier));
    }

    if !state.board.is_valid_position(position) {
        return Err(RuleViolation::OutOfBounds(position));
    }
    if state.board.is_occupied(position) {
        return Err(RuleViolation::PositionOccupied(position));
    }

    let player_index = state
        .player_index(player_id)
        .ok_or_else(|| RuleViolation::PlayerNotFound(player_id.clone()))?;
    if !state.board.get_deployable_positions(player_index).contains(&position) {
        return Err(RuleViolation::NotDeploymentZone(position));
    }

    Ok(())
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Validate, then apply an action.
pub fn execute_action(action: &Action, state: &mut GameState, player_id: &PlayerId) -> ActionResult {
    if let Err(violation) = validate_action(action, state, player_id) {
        debug!("Refused {:?} from {}: {}", action, player_id, violation);
        return ActionResult::refused(action, &violation);
    }

    match action {
        Action::Move { token_id, destination } => execute_move(state, *token_id, *destination),
        Action::Attack { attacker_id, defender_id } => execute_attack(state, *attacker_id, *defender_id),
        Action::Deploy { health_value, position } => execute_deploy(state, player_id, *health_value, *position),
        Action::EndTurn => execute_end_turn(state),
    }
}

fn unexpected(message: &str) -> ActionResult {
    ActionResult {
        success: false,
        message: message.to_string(),
        data: None,
        events: Vec::new(),
    }
}

fn execute_move(state: &mut GameState, token_id: TokenId, destination: GridPos) -> ActionResult {
    let Some(old_position) = state.get_token(token_id).map(|t| t.position) else {
        return unexpected("Move failed unexpectedly");
    };
    let Some(moved) = state.move_token(token_id, destination) else {
        return unexpected("Move failed unexpectedly");
    };

    let mut events = vec![moved];
    let mut message = format!("Token #{} moved from {} to {}", token_id, old_position, destination);
    let mut new_position = destination;

    let mystery = if state.board.cell_type_at(destination) == Some(CellType::Mystery) {
        state.trigger_mystery(token_id)
    } else {
        None
    };

    if let Some(result) = &mystery {
        message.push_str("\nToken landed on a mystery square!");
        match result.effect {
            MysteryEffect::Heal => message.push_str(&format!(
                "\nHeads: healed from {} to {} HP",
                result.old_health, result.new_health
            )),
            MysteryEffect::Teleport => {
                new_position = result.new_position;
                message.push_str(&format!("\nTails: teleported back to {}", result.new_position));
            }
        }
        events.push(GameEvent::mystery_triggered(state.turn_number, result.clone()));
    }

    state.turn_phase = TurnPhase::Action;
    message.push_str("\nPhase changed to ACTION (attack or end turn)");

    ActionResult {
        success: true,
        message,
        data: Some(ActionData::Moved {
            token_id,
            old_position,
            new_position,
            mystery,
        }),
        events,
    }
}

fn execute_attack(state: &mut GameState, attacker_id: TokenId, defender_id: TokenId) -> ActionResult {
    let Some(attacker) = state.get_token(attacker_id).cloned() else {
        return unexpected("Attack failed unexpectedly");
    };
    let Some(defender) = state.tokens.get_mut(&defender_id) else {
        return unexpected("Attack failed unexpectedly");
    };

    let outcome = combat::resolve_combat(&attacker, defender);
    let defender_owner = defender.player_id.clone();
    let owner_name = state
        .get_player(&defender_owner)
        .map_or_else(|| "Unknown".to_string(), |p| p.name.clone());

    let mut message = format!(
        "Token #{} attacked token #{} ({})\nDealt {} damage",
        attacker_id, defender_id, owner_name, outcome.damage_dealt
    );

    let mut events = vec![GameEvent::combat_resolved(state.turn_number, outcome.clone())];
    if outcome.defender_killed {
        message.push_str(&format!("\nToken #{} was KILLED!", defender_id));
        events.extend(state.remove_token(defender_id));
    } else {
        message.push_str(&format!("\nToken #{} now has {}hp", defender_id, outcome.defender_health));
    }

    state.turn_phase = TurnPhase::EndTurn;

    ActionResult {
        success: true,
        message,
        data: Some(ActionData::Attacked { outcome }),
        events,
    }
}

fn execute_deploy(state: &mut GameState, player_id: &PlayerId, health_value: u8, position: GridPos) -> ActionResult {
    let Some(token_id) = state.deploy_token(player_id, health_value, position) else {
        return unexpected("Deployment failed unexpectedly");
    };
    let tier = HealthTier::from_value(health_value);
    let remaining = tier
        .and_then(|t| state.get_reserve_token_counts(player_id).get(&t).copied())
        .unwrap_or(0);

    let mut events = Vec::new();
    if let Some(tier) = tier {
        events.push(GameEvent::token_deployed(state.turn_number, player_id.clone(), token_id, tier, position));
    }

    state.turn_phase = TurnPhase::Action;

    let message = format!(
        "Deployed {}hp token #{} at {}\n{} x {}hp tokens remaining in reserve\nPhase changed to ACTION (attack or end turn)",
        health_value, token_id, position, remaining, health_value
    );

    ActionResult {
        success: true,
        message,
        data: Some(ActionData::Deployed {
            token_id,
            health_value,
            position,
            tokens_remaining: remaining,
        }),
        events,
    }
}

fn execute_end_turn(state: &mut GameState) -> ActionResult {
    let result = state.end_turn();

    let message = match &result.winner {
        Some(winner) => {
            let name = state.get_player(winner).map_or(winner.as_str(), |p| p.name.as_str());
            format!("Turn ended\n{} captured the crystal and wins!", name)
        }
        None => {
            let name = state.get_current_player().map_or("Unknown", |p| p.name.as_str());
            format!("Turn ended\nTurn {} begins\nCurrent player: {}", state.turn_number, name)
        }
    };

    ActionResult {
        success: true,
        message,
        data: Some(ActionData::TurnEnded {
            turn_number: state.turn_number,
            next_player_id: if result.game_ended { None } else { state.current_turn_player_id.clone() },
            generators_disabled: result.newly_disabled,
            winner_id: result.winner,
        }),
        events: result.events,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::RulesConfig;
    use crate::game::events::GameEventData;
    use crate::game::player::PlayerColor;

    fn p(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    /// Two-player game with the mystery squares flattened to normal cells.
    fn game() -> GameState {
        let mut state = GameState::new(RulesConfig::default(), 99);
        for pos in state.board.get_mystery_positions() {
            state.board.set_cell_type(pos, CellType::Normal);
        }
        state.add_player(p("p1"), "Alice", PlayerColor::Cyan).unwrap();
        state.add_player(p("p2"), "Bob", PlayerColor::Magenta).unwrap();
        state.start_game().unwrap();
        state
    }

    fn deploy(state: &mut GameState, player: &str, hp: u8, x: i32, y: i32) -> TokenId {
        let result = execute_action(
            &Action::Deploy {
                health_value: hp,
                position: GridPos::new(x, y),
            },
            state,
            &p(player),
        );
        assert!(result.success, "{}", result.message);
        match result.data {
            Some(ActionData::Deployed { token_id, .. }) => token_id,
            other => panic!("unexpected data {:?}", other),
        }
    }

    fn end_turn(state: &mut GameState, player: &str) {
        assert!(execute_action(&Action::EndTurn, state, &p(player)).success);
    }

    #[test]
    fn test_not_your_turn() {
        let state = game();
        assert_eq!(
            validate_action(&Action::EndTurn, &state, &p("p2")),
            Err(RuleViolation::NotYourTurn { player_id: p("p2") })
        );
    }

    #[test]
    fn test_not_playing() {
        let state = GameState::new(RulesConfig::default(), 1);
        assert!(matches!(
            validate_action(&Action::EndTurn, &state, &p("p1")),
            Err(RuleViolation::WrongGamePhase { .. })
        ));
    }

    #[test]
    fn test_deploy_rules() {
        let mut state = game();
        let check = |state: &GameState, hp, x, y| {
            validate_action(
                &Action::Deploy {
                    health_value: hp,
                    position: GridPos::new(x, y),
                },
                state,
                &p("p1"),
            )
        };

        assert_eq!(check(&state, 7, 0, 0), Err(RuleViolation::InvalidHealthTier(7)));
        assert_eq!(check(&state, 10, -1, 0), Err(RuleViolation::OutOfBounds(GridPos::new(-1, 0))));
        assert_eq!(check(&state, 10, 3, 0), Err(RuleViolation::NotDeploymentZone(GridPos::new(3, 0))));
        assert_eq!(check(&state, 10, 2, 2), Ok(()));

        deploy(&mut state, "p1", 10, 2, 2);
        assert_eq!(state.turn_phase, TurnPhase::Action);

        // Second placement in the same turn is refused
        assert!(matches!(check(&state, 10, 1, 1), Err(RuleViolation::WrongTurnPhase { .. })));

        end_turn(&mut state, "p1");
        end_turn(&mut state, "p2");
        assert_eq!(check(&state, 10, 2, 2), Err(RuleViolation::PositionOccupied(GridPos::new(2, 2))));
    }

    #[test]
    fn test_deploy_rules_for_every_tier() {
        for tier in HealthTier::ALL {
            let mut state = game();
            let hp = tier.value();
            let zone = state.board.get_deployable_positions(0);
            let check = |state: &GameState, position: GridPos| {
                validate_action(&Action::Deploy { health_value: hp, position }, state, &p("p1"))
            };

            assert_eq!(check(&state, zone[0]), Ok(()), "{}", tier);
            assert_eq!(
                check(&state, GridPos::new(3, 0)),
                Err(RuleViolation::NotDeploymentZone(GridPos::new(3, 0)))
            );
            assert_eq!(
                check(&state, GridPos::new(-1, 0)),
                Err(RuleViolation::OutOfBounds(GridPos::new(-1, 0)))
            );

            state.deploy_token(&p("p1"), hp, zone[0]).unwrap();
            assert_eq!(check(&state, zone[0]), Err(RuleViolation::PositionOccupied(zone[0])));

            // Drain the rest of this tier's reserve
            for &pos in &zone[1..5] {
                state.deploy_token(&p("p1"), hp, pos).unwrap();
            }
            assert_eq!(check(&state, zone[5]), Err(RuleViolation::NoReserveToken(tier)));

            // Other tiers are unaffected
            for other in HealthTier::ALL.into_iter().filter(|t| *t != tier) {
                let deploy_other = Action::Deploy {
                    health_value: other.value(),
                    position: zone[5],
                };
                assert_eq!(validate_action(&deploy_other, &state, &p("p1")), Ok(()));
            }
        }
    }

    #[test]
    fn test_deploy_exhausts_reserve() {
        let mut state = game();
        for i in 0..5 {
            deploy(&mut state, "p1", 4, 0, i % 3);
            // Clear the spot for the next deploy
            let id = state.board.occupants_at(GridPos::new(0, i % 3))[0];
            state.remove_token(id);
            end_turn(&mut state, "p1");
            end_turn(&mut state, "p2");
        }
        assert_eq!(
            validate_action(
                &Action::Deploy {
                    health_value: 4,
                    position: GridPos::new(0, 0)
                },
                &state,
                &p("p1")
            ),
            Err(RuleViolation::NoReserveToken(HealthTier::Four))
        );
    }

    #[test]
    fn test_move_then_attack_flow() {
        let mut state = game();
        let mine = deploy(&mut state, "p1", 10, 2, 2);
        end_turn(&mut state, "p1");
        let theirs = deploy(&mut state, "p2", 4, 21, 2);
        end_turn(&mut state, "p2");

        // Put the enemy next to us by hand
        state.move_token(theirs, GridPos::new(4, 3));

        let wrong = execute_action(
            &Action::Move {
                token_id: mine,
                destination: GridPos::new(5, 5),
            },
            &mut state,
            &p("p1"),
        );
        assert!(!wrong.success);
        assert!(wrong.message.starts_with("Cannot move"));

        let moved = execute_action(
            &Action::Move {
                token_id: mine,
                destination: GridPos::new(3, 3),
            },
            &mut state,
            &p("p1"),
        );
        assert!(moved.success, "{}", moved.message);
        assert_eq!(state.turn_phase, TurnPhase::Action);
        assert!(matches!(moved.events[0].data, GameEventData::TokenMoved { .. }));

        // Cannot move twice
        assert!(matches!(
            validate_action(&Action::Move { token_id: mine, destination: GridPos::new(3, 4) }, &state, &p("p1")),
            Err(RuleViolation::WrongTurnPhase { .. })
        ));

        let attack = execute_action(
            &Action::Attack {
                attacker_id: mine,
                defender_id: theirs,
            },
            &mut state,
            &p("p1"),
        );
        assert!(attack.success);
        match attack.data {
            Some(ActionData::Attacked { outcome }) => {
                assert_eq!(outcome.damage_dealt, 5);
                assert!(outcome.defender_killed);
            }
            other => panic!("unexpected data {:?}", other),
        }
        assert!(!state.get_token(theirs).unwrap().is_alive);
        assert!(!state.board.is_occupied(GridPos::new(4, 3)));
        assert!(attack
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::TokenKilled { .. })));

        // At most one attack
        assert_eq!(state.turn_phase, TurnPhase::EndTurn);
        assert!(validate_action(&Action::Attack { attacker_id: mine, defender_id: theirs }, &state, &p("p1")).is_err());
        assert!(validate_action(&Action::EndTurn, &state, &p("p1")).is_ok());
    }

    #[test]
    fn test_move_onto_mystery_square() {
        let mut state = game();
        let mine = deploy(&mut state, "p1", 10, 2, 2);
        end_turn(&mut state, "p1");
        end_turn(&mut state, "p2");

        let mystery = GridPos::new(3, 3);
        state.board.set_cell_type(mystery, CellType::Mystery);

        let result = execute_action(
            &Action::Move {
                token_id: mine,
                destination: mystery,
            },
            &mut state,
            &p("p1"),
        );
        assert!(result.success);
        assert!(result.message.contains("mystery square"));
        assert_eq!(result.events.len(), 2);
        assert!(matches!(result.events[1].data, GameEventData::MysteryTriggered { .. }));

        match result.data {
            Some(ActionData::Moved {
                new_position,
                mystery: Some(effect),
                ..
            }) => {
                assert_eq!(new_position, effect.new_position);
                assert_eq!(state.get_token(mine).unwrap().position, new_position);
            }
            other => panic!("unexpected data {:?}", other),
        }
        state.verify_consistency().unwrap();
        assert_eq!(state.turn_phase, TurnPhase::Action);
    }

    #[test]
    fn test_attack_validation() {
        let mut state = game();
        let mine = deploy(&mut state, "p1", 10, 2, 2);
        let other_mine = state.deploy_token(&p("p1"), 8, GridPos::new(1, 1)).unwrap();

        let attack = |state: &GameState, a, d| {
            validate_action(&Action::Attack { attacker_id: a, defender_id: d }, state, &p("p1"))
        };

        assert_eq!(attack(&state, mine, other_mine), Err(RuleViolation::OwnTokenAttack));
        assert_eq!(attack(&state, 9999, other_mine), Err(RuleViolation::TokenNotFound(9999)));

        let enemy_reserve = state.get_reserve_tokens(&p("p2"))[0].id;
        assert_eq!(attack(&state, mine, enemy_reserve), Err(RuleViolation::TokenNotDeployed(enemy_reserve)));

        let far_enemy = state.deploy_token(&p("p2"), 10, GridPos::new(21, 0)).unwrap();
        assert_eq!(
            attack(&state, mine, far_enemy),
            Err(RuleViolation::NotAdjacent { attacker_id: mine, defender_id: far_enemy })
        );
    }

    #[test]
    fn test_end_turn_result() {
        let mut state = game();
        let result = execute_action(&Action::EndTurn, &mut state, &p("p1"));
        assert!(result.success);
        match result.data {
            Some(ActionData::TurnEnded { next_player_id, winner_id, .. }) => {
                assert_eq!(next_player_id, Some(p("p2")));
                assert!(winner_id.is_none());
            }
            other => panic!("unexpected data {:?}", other),
        }
        assert!(result.message.contains("Bob"));
    }

    #[test]
    fn test_refused_action_leaves_state_unchanged() {
        let mut state = game();
        let before = state.clone();
        let result = execute_action(
            &Action::Deploy {
                health_value: 10,
                position: GridPos::new(12, 12),
            },
            &mut state,
            &p("p1"),
        );
        assert!(!result.success);
        assert_eq!(state, before);
    }

    #[test]
    fn test_check_action_messages() {
        let state = game();
        let ok = check_action(&Action::EndTurn, &state, &p("p1"));
        assert!(ok.is_valid);
        assert_eq!(ok.message, "End turn is valid");

        let bad = check_action(&Action::EndTurn, &state, &p("p2"));
        assert!(!bad.is_valid);
        assert_eq!(bad.message, "Cannot end turn: it is not p2's turn");
    }

    #[test]
    fn test_action_json_shape() {
        let json = serde_json::to_string(&Action::Move {
            token_id: 3,
            destination: GridPos::new(1, 2),
        })
        .unwrap();
        assert_eq!(json, r#"{"action_type":"MOVE","token_id":3,"destination":[1,2]}"#);

        let end: Action = serde_json::from_str(r#"{"action_type":"END_TURN"}"#).unwrap();
        assert_eq!(end, Action::EndTurn);
    }
}
