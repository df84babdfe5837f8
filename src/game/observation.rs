//! Observation
//!
//! Text and structured views of a game from one player's seat, for AI
//! players, terminals and chat bridges. Nothing here mutates state.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::core::grid::GridPos;
use crate::game::combat;
use crate::game::crystal::Crystal;
use crate::game::generator::Generator;
use crate::game::movement;
use crate::game::player::PlayerId;
use crate::game::state::{GamePhase, GameState, TurnPhase};
use crate::game::token::{HealthTier, TokenId};

const RULE: &str = "============================================================";

const SYMBOL_EMPTY: char = '.';
const SYMBOL_CRYSTAL: char = 'C';
const SYMBOL_MYSTERY: char = 'M';
const SYMBOL_CORNER: char = '*';

// =============================================================================
// STRUCTURED ACTIONS
// =============================================================================

/// Where the viewer stands in the turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservedPhase {
    /// Game not in progress.
    NotPlaying,
    /// Someone else is playing.
    NotYourTurn,
    /// Move or deploy.
    Movement,
    /// Attack or end.
    Action,
    /// Only ending remains.
    EndTurn,
}

impl From<TurnPhase> for ObservedPhase {
    fn from(phase: TurnPhase) -> Self {
        match phase {
            TurnPhase::Movement => ObservedPhase::Movement,
            TurnPhase::Action => ObservedPhase::Action,
            TurnPhase::EndTurn => ObservedPhase::EndTurn,
        }
    }
}

/// One legal option, with enough context to pick between them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailableAction {
    /// A token with somewhere to go.
    Move {
        token_id: TokenId,
        token_position: GridPos,
        token_health: String,
        valid_destinations: Vec<GridPos>,
        description: String,
    },
    /// A reserve tier with free deployment cells.
    Deploy {
        health_value: u8,
        positions: Vec<GridPos>,
        remaining: u32,
        description: String,
    },
    /// An enemy in reach.
    Attack {
        attacker_id: TokenId,
        attacker_position: GridPos,
        defender_id: TokenId,
        defender_position: GridPos,
        defender_owner: String,
        damage: u8,
        will_kill: bool,
        description: String,
    },
    /// Pass play on.
    EndTurn {
        description: String,
    },
}

impl AvailableAction {
    /// One-line summary.
    pub fn description(&self) -> &str {
        match self {
            AvailableAction::Move { description, .. }
            | AvailableAction::Deploy { description, .. }
            | AvailableAction::Attack { description, .. }
            | AvailableAction::EndTurn { description } => description,
        }
    }
}

/// Everything a player may do right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableActions {
    /// Turn-cycle position.
    pub phase: ObservedPhase,
    /// Legal options (empty when it is not the viewer's turn).
    pub actions: Vec<AvailableAction>,
}

/// List the legal actions for `player_id`.
pub fn list_available_actions(state: &GameState, player_id: &PlayerId) -> AvailableActions {
    if state.phase != GamePhase::Playing {
        return AvailableActions {
            phase: ObservedPhase::NotPlaying,
            actions: Vec::new(),
        };
    }
    if !state.is_player_turn(player_id) {
        return AvailableActions {
            phase: ObservedPhase::NotYourTurn,
            actions: Vec::new(),
        };
    }

    let phase = ObservedPhase::from(state.turn_phase);
    let Some(player_index) = state.player_index(player_id) else {
        return AvailableActions {
            phase,
            actions: Vec::new(),
        };
    };

    let deployed = state.get_player_tokens(player_id);
    let mut actions = Vec::new();

    match state.turn_phase {
        TurnPhase::Movement => {
            for token in &deployed {
                let destinations = movement::get_valid_moves(token, &state.board, &state.tokens);
                if destinations.is_empty() {
                    continue;
                }
                actions.push(AvailableAction::Move {
                    token_id: token.id,
                    token_position: token.position,
                    token_health: format!("{}/{}", token.health, token.max_health.value()),
                    valid_destinations: destinations.into_iter().collect(),
                    description: format!(
                        "Move token #{} ({}) from {}",
                        token.id, token.max_health, token.position
                    ),
                });
            }

            let free: Vec<GridPos> = state
                .board
                .get_deployable_positions(player_index)
                .into_iter()
                .filter(|pos| !state.board.is_occupied(*pos))
                .collect();
            if !free.is_empty() {
                for (tier, remaining) in reserve_counts_heaviest_first(state, player_id) {
                    if remaining == 0 {
                        continue;
                    }
                    actions.push(AvailableAction::Deploy {
                        health_value: tier.value(),
                        positions: free.clone(),
                        remaining,
                        description: format!("Deploy {} token from reserve ({} remaining)", tier, remaining),
                    });
                }
            }
        }
        TurnPhase::Action => {
            for attacker in &deployed {
                for defender_id in combat::get_attackable_targets(attacker, &state.tokens) {
                    let Some(defender) = state.get_token(defender_id) else {
                        continue;
                    };
                    let damage = attacker.attack_power();
                    let will_kill = combat::would_kill(attacker, defender);
                    let owner = color_name_of(state, &defender.player_id);
                    actions.push(AvailableAction::Attack {
                        attacker_id: attacker.id,
                        attacker_position: attacker.position,
                        defender_id,
                        defender_position: defender.position,
                        description: format!(
                            "Attack token #{} ({}) with token #{} for {} damage{}",
                            defender_id,
                            owner,
                            attacker.id,
                            damage,
                            if will_kill { " (KILL)" } else { "" }
                        ),
                        defender_owner: owner,
                        damage,
                        will_kill,
                    });
                }
            }
        }
        TurnPhase::EndTurn => {}
    }

    actions.push(AvailableAction::EndTurn {
        description: "End your turn".to_string(),
    });

    AvailableActions { phase, actions }
}

// =============================================================================
// TEXT VIEWS
// =============================================================================

/// Full text description of the game from one seat.
pub fn describe_game_state(state: &GameState, viewer: &PlayerId) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);

    match state.phase {
        GamePhase::Ended => {
            let winner = state
                .winner_id
                .as_ref()
                .and_then(|id| state.get_player(id))
                .map_or("Unknown", |p| p.name.as_str());
            let _ = writeln!(out, "GAME OVER - Winner: {}", winner);
        }
        GamePhase::Setup => {
            let _ = writeln!(out, "GAME SETUP - Waiting for players");
        }
        GamePhase::Playing => {
            let indicator = if state.is_player_turn(viewer) { "YOUR TURN" } else { "WAITING" };
            let (name, color) = state
                .get_current_player()
                .map_or(("Unknown", "Unknown"), |p| (p.name.as_str(), p.color.name()));
            let _ = writeln!(
                out,
                "TURN {} - {} (Current: {} - {})",
                state.turn_number, indicator, name, color
            );
        }
    }
    let _ = writeln!(out, "{}\n", RULE);

    if state.phase == GamePhase::Playing {
        let _ = writeln!(out, "Phase: {:?}", state.turn_phase);
        let hint = match state.turn_phase {
            TurnPhase::Movement => "You can move a token or deploy a new token",
            TurnPhase::Action => "You can attack with a token or end your turn",
            TurnPhase::EndTurn => "You can end your turn",
        };
        let _ = writeln!(out, "  -> {}\n", hint);
    }

    if state.get_player(viewer).is_some() {
        let deployed = state.get_player_tokens(viewer);
        let reserve = state.get_reserve_tokens(viewer);
        let _ = writeln!(
            out,
            "YOUR TOKENS ({} deployed, {} in reserve):",
            deployed.len(),
            reserve.len()
        );
        if deployed.is_empty() {
            let _ = writeln!(out, "  (none deployed)");
        }
        for token in &deployed {
            let _ = writeln!(
                out,
                "  Token #{:2} @ ({:2},{:2}) - {}/{}hp  [Move range: {}]",
                token.id,
                token.position.x,
                token.position.y,
                token.health,
                token.max_health.value(),
                token.movement_range()
            );
        }

        let counts: Vec<String> = reserve_counts_heaviest_first(state, viewer)
            .into_iter()
            .map(|(tier, n)| format!("{}: {}", tier, n))
            .collect();
        let _ = writeln!(out, "\nRESERVE TOKENS:\n  {}\n", counts.join("  |  "));
    }

    let enemies: Vec<_> = state
        .turn_order
        .iter()
        .filter(|id| *id != viewer)
        .filter_map(|id| state.get_player(id))
        .collect();
    if !enemies.is_empty() {
        let _ = writeln!(out, "ENEMY TOKENS:");
        for enemy in enemies {
            let tokens = state.get_player_tokens(&enemy.id);
            let status = if enemy.is_active { "" } else { " [eliminated]" };
            let _ = writeln!(
                out,
                "  {} ({}){}: {} deployed",
                enemy.name,
                enemy.color.name(),
                status,
                tokens.len()
            );
            for token in tokens {
                let _ = writeln!(
                    out,
                    "    Token #{:2} @ ({:2},{:2}) - {}/{}hp",
                    token.id,
                    token.position.x,
                    token.position.y,
                    token.health,
                    token.max_health.value()
                );
            }
        }
        out.push('\n');
    }

    if !state.generators.is_empty() {
        let _ = writeln!(out, "GENERATORS:");
        for (i, gen) in state.generators.iter().enumerate() {
            let _ = writeln!(out, "  G{} @ {}: {}", i + 1, gen.position, generator_status(state, gen));
        }
        out.push('\n');
    }

    if let Some(crystal) = &state.crystal {
        let disabled = state.disabled_generator_count();
        let _ = writeln!(out, "CRYSTAL:");
        let _ = writeln!(out, "  Location: {}", crystal.position);
        let _ = writeln!(out, "  Tokens needed to capture: {}", state.crystal_tokens_required());
        if disabled > 0 {
            let _ = writeln!(
                out,
                "  (Base: {}, reduced by {} disabled generator(s))",
                Crystal::BASE_TOKENS_REQUIRED,
                disabled
            );
        }
        let holders = crystal_holders(state, crystal);
        if !holders.is_empty() {
            let _ = writeln!(out, "  Current holders:");
            for (player_id, count) in &holders {
                if let Some(player) = state.get_player(player_id) {
                    let _ = writeln!(out, "    {} ({}): {} tokens", player.name, player.color.name(), count);
                }
            }
        }
        out.push('\n');
    }

    out.push_str(RULE);
    out
}

/// ASCII map of the board from one seat. Own tokens are upper case.
pub fn board_map(state: &GameState, viewer: &PlayerId) -> String {
    let (width, height) = (state.board.width(), state.board.height());
    let mut grid: Vec<Vec<char>> = (0..height)
        .map(|_| vec![SYMBOL_EMPTY; width.max(0) as usize])
        .collect();

    let mut mark = |pos: GridPos, symbol: char, only_if_empty: bool| {
        if !state.board.is_valid_position(pos) {
            return;
        }
        let cell = &mut grid[pos.y as usize][pos.x as usize];
        if !only_if_empty || *cell == SYMBOL_EMPTY {
            *cell = symbol;
        }
    };

    for (i, gen) in state.generators.iter().enumerate() {
        let digit = char::from_digit(i as u32 + 1, 10).unwrap_or('G');
        mark(gen.position, digit, false);
    }
    if let Some(crystal) = &state.crystal {
        mark(crystal.position, SYMBOL_CRYSTAL, false);
    }
    for pos in state.board.get_mystery_positions() {
        mark(pos, SYMBOL_MYSTERY, true);
    }
    for index in 0..4 {
        mark(state.board.get_starting_position(index), SYMBOL_CORNER, true);
    }

    for token in state.tokens.values().filter(|t| t.is_active()) {
        let Some(owner) = state.get_player(&token.player_id) else {
            continue;
        };
        let symbol = owner.color.symbol();
        let symbol = if &token.player_id == viewer {
            symbol.to_ascii_uppercase()
        } else {
            symbol
        };
        mark(token.position, symbol, false);
    }

    let mut out = String::new();
    let _ = writeln!(out, "BOARD MAP ({}x{}):\n", width, height);

    let header: String = (0..width).step_by(2).map(|x| format!("{:2}  ", x)).collect();
    let _ = writeln!(out, "     {}", header.trim_end());
    let border = format!("   +{}+", "-".repeat(width.max(0) as usize * 2));
    let _ = writeln!(out, "{}", border);
    for (y, row) in grid.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(char::to_string).collect();
        let _ = writeln!(out, "{:2} | {} |", y, cells.join(" "));
    }
    let _ = writeln!(out, "{}\n", border);

    let _ = writeln!(out, "LEGEND:");
    if let Some(player) = state.get_player(viewer) {
        let _ = writeln!(out, "  {} = Your tokens", player.color.symbol().to_ascii_uppercase());
    }
    let _ = writeln!(out, "  c/m/y/g = Enemy tokens (cyan/magenta/yellow/green)");
    let _ = writeln!(out, "  C = Crystal");
    let _ = writeln!(out, "  1,2,3,4 = Generators (G1-G4)");
    let _ = writeln!(out, "  M = Mystery square");
    let _ = writeln!(out, "  * = Deployment corner");
    let _ = write!(out, "  . = Empty cell");
    out
}

/// Current win requirement and everyone's progress toward it.
pub fn explain_victory_conditions(state: &GameState) -> String {
    let disabled = state.disabled_generator_count();
    let required = state.crystal_tokens_required();
    let turns_required = Crystal::TURNS_REQUIRED;

    let mut out = String::new();
    let _ = writeln!(out, "VICTORY CONDITIONS:\n");
    let _ = writeln!(
        out,
        "Win by holding the crystal with {} tokens for {} consecutive turns",
        required, turns_required
    );
    let _ = writeln!(out, "  Base requirement: {} tokens", Crystal::BASE_TOKENS_REQUIRED);
    if disabled > 0 {
        let _ = writeln!(
            out,
            "  Disabled generators: {} (-{} tokens)",
            disabled,
            disabled * Generator::TOKEN_REDUCTION
        );
    }
    out.push('\n');

    if let Some(crystal) = &state.crystal {
        let holders = crystal_holders(state, crystal);
        if holders.is_empty() {
            let _ = writeln!(out, "  No players currently on crystal");
        } else {
            let _ = writeln!(out, "Current crystal progress:");
            for (player_id, count) in &holders {
                let Some(player) = state.get_player(player_id) else {
                    continue;
                };
                let turns_held = if crystal.holding_player_id.as_ref() == Some(player_id) {
                    crystal.turns_held
                } else {
                    0
                };
                let progress = format!(
                    "{}/{} tokens, held for {}/{} turns",
                    count, required, turns_held, turns_required
                );
                let outlook = if *count >= required && turns_held >= turns_required {
                    " WINNING!".to_string()
                } else if *count >= required {
                    format!(" (needs {} more turn(s))", turns_required - turns_held)
                } else {
                    format!(" (needs {} more token(s))", required - count)
                };
                let _ = writeln!(out, "  {} ({}): {}{}", player.name, player.color.name(), progress, outlook);
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Generator bonuses:");
    let _ = write!(
        out,
        "  Disable generators to reduce crystal requirement (each generator = -{} tokens)",
        Generator::TOKEN_REDUCTION
    );
    for (i, gen) in state.generators.iter().enumerate() {
        let _ = write!(out, "\n  Generator {}: {}", i + 1, generator_status(state, gen));
    }
    out
}

/// Everything at once: state, map, options and the victory picture.
pub fn situation_report(state: &GameState, viewer: &PlayerId) -> String {
    let mut sections = vec![describe_game_state(state, viewer), board_map(state, viewer)];

    let available = list_available_actions(state, viewer);
    let mut actions = String::from("AVAILABLE ACTIONS:");
    if available.actions.is_empty() {
        actions.push_str(match available.phase {
            ObservedPhase::NotYourTurn => "\n  (waiting for other player's turn)",
            _ => "\n  (no actions available)",
        });
    }
    for (i, action) in available.actions.iter().enumerate() {
        let _ = write!(actions, "\n  {}. {}", i + 1, action.description());
    }
    sections.push(actions);
    sections.push(explain_victory_conditions(state));

    sections.join("\n\n")
}

// =============================================================================
// HELPERS
// =============================================================================

fn reserve_counts_heaviest_first(state: &GameState, player_id: &PlayerId) -> Vec<(HealthTier, u32)> {
    let counts = state.get_reserve_token_counts(player_id);
    HealthTier::ALL
        .into_iter()
        .map(|tier| (tier, counts.get(&tier).copied().unwrap_or(0)))
        .collect()
}

fn color_name_of(state: &GameState, player_id: &PlayerId) -> String {
    state
        .get_player(player_id)
        .map_or("Unknown", |p| p.color.name())
        .to_string()
}

fn generator_status(state: &GameState, gen: &Generator) -> String {
    if gen.is_disabled {
        return "DISABLED".to_string();
    }
    match gen.capturing_player_id.as_ref().and_then(|id| state.get_player(id)) {
        Some(player) => {
            let (held, required) = gen.capture_progress();
            format!(
                "Being captured by {} ({}) - {} tokens, {}/{} turns",
                player.name,
                player.color.name(),
                gen.capture_token_ids.len(),
                held,
                required
            )
        }
        None => "Uncontested".to_string(),
    }
}

/// Living tokens on the crystal per player, in join order.
fn crystal_holders(state: &GameState, crystal: &Crystal) -> Vec<(PlayerId, u32)> {
    let mut counts: BTreeMap<&PlayerId, u32> = BTreeMap::new();
    for token in state.get_tokens_at_position(crystal.position) {
        *counts.entry(&token.player_id).or_insert(0) += 1;
    }
    state
        .turn_order
        .iter()
        .filter_map(|id| counts.get(id).map(|n| (id.clone(), *n)))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actions::{execute_action, Action};
    use crate::game::board::CellType;
    use crate::game::config::RulesConfig;
    use crate::game::player::PlayerColor;

    fn p(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    fn game() -> GameState {
        let mut state = GameState::new(RulesConfig::default(), 2024);
        for pos in state.board.get_mystery_positions() {
            state.board.set_cell_type(pos, CellType::Normal);
        }
        state.add_player(p("p1"), "Alice", PlayerColor::Cyan).unwrap();
        state.add_player(p("p2"), "Bob", PlayerColor::Magenta).unwrap();
        state.start_game().unwrap();
        state
    }

    #[test]
    fn test_actions_outside_play_or_turn() {
        let setup = GameState::new(RulesConfig::default(), 1);
        assert_eq!(list_available_actions(&setup, &p("p1")).phase, ObservedPhase::NotPlaying);

        let state = game();
        let waiting = list_available_actions(&state, &p("p2"));
        assert_eq!(waiting.phase, ObservedPhase::NotYourTurn);
        assert!(waiting.actions.is_empty());
    }

    #[test]
    fn test_movement_phase_actions() {
        let mut state = game();
        state.deploy_token(&p("p1"), 6, GridPos::new(1, 1)).unwrap();

        let available = list_available_actions(&state, &p("p1"));
        assert_eq!(available.phase, ObservedPhase::Movement);

        let moves: Vec<_> = available
            .actions
            .iter()
            .filter(|a| matches!(a, AvailableAction::Move { .. }))
            .collect();
        assert_eq!(moves.len(), 1);

        let deploys: Vec<_> = available
            .actions
            .iter()
            .filter_map(|a| match a {
                AvailableAction::Deploy { health_value, positions, remaining, .. } => {
                    Some((*health_value, positions.len(), *remaining))
                }
                _ => None,
            })
            .collect();
        assert_eq!(deploys, vec![(10, 8, 5), (8, 8, 5), (6, 8, 4), (4, 8, 5)]);

        assert!(matches!(available.actions.last(), Some(AvailableAction::EndTurn { .. })));
    }

    #[test]
    fn test_action_phase_lists_attacks() {
        let mut state = game();
        let mine = state.deploy_token(&p("p1"), 10, GridPos::new(5, 5)).unwrap();
        let theirs = state.deploy_token(&p("p2"), 4, GridPos::new(6, 5)).unwrap();
        state.turn_phase = TurnPhase::Action;

        let available = list_available_actions(&state, &p("p1"));
        assert_eq!(available.phase, ObservedPhase::Action);
        match &available.actions[0] {
            AvailableAction::Attack {
                attacker_id,
                defender_id,
                damage,
                will_kill,
                defender_owner,
                description,
                ..
            } => {
                assert_eq!((*attacker_id, *defender_id), (mine, theirs));
                assert_eq!(*damage, 5);
                assert!(*will_kill);
                assert_eq!(defender_owner, "Magenta");
                assert!(description.ends_with("(KILL)"));
            }
            other => panic!("expected attack, got {:?}", other),
        }
        assert_eq!(available.actions.len(), 2);
    }

    #[test]
    fn test_available_actions_serialize() {
        let state = game();
        let json = serde_json::to_string(&list_available_actions(&state, &p("p1"))).unwrap();
        assert!(json.contains("\"phase\":\"MOVEMENT\""));
        assert!(json.contains("\"type\":\"DEPLOY\""));
        assert!(json.contains("\"type\":\"END_TURN\""));
    }

    #[test]
    fn test_describe_game_state() {
        let mut state = game();
        state.deploy_token(&p("p1"), 8, GridPos::new(0, 1)).unwrap();
        state.deploy_token(&p("p2"), 10, GridPos::new(23, 1)).unwrap();

        let mine = describe_game_state(&state, &p("p1"));
        assert!(mine.contains("TURN 1 - YOUR TURN (Current: Alice - Cyan)"));
        assert!(mine.contains("YOUR TOKENS (1 deployed, 19 in reserve):"));
        assert!(mine.contains("10hp: 5  |  8hp: 4  |  6hp: 5  |  4hp: 5"));
        assert!(mine.contains("Bob (Magenta): 1 deployed"));
        assert!(mine.contains("Tokens needed to capture: 12"));

        let theirs = describe_game_state(&state, &p("p2"));
        assert!(theirs.contains("WAITING"));
    }

    #[test]
    fn test_board_map_symbols() {
        let mut state = game();
        state.deploy_token(&p("p1"), 8, GridPos::new(1, 0)).unwrap();
        state.deploy_token(&p("p2"), 8, GridPos::new(22, 0)).unwrap();

        let map = board_map(&state, &p("p1"));
        let rows: Vec<&str> = map.lines().collect();
        let row0 = rows.iter().find(|l| l.starts_with(" 0 |")).unwrap();
        assert!(row0.starts_with(" 0 | * C"));
        assert!(row0.ends_with("m * |"));

        let row6 = rows.iter().find(|l| l.starts_with(" 6 |")).unwrap();
        let cells: Vec<&str> = row6[5..].split(' ').collect();
        assert_eq!(cells[6], "1");

        let row12 = rows.iter().find(|l| l.starts_with("12 |")).unwrap();
        let cells: Vec<&str> = row12[5..].split(' ').collect();
        assert_eq!(cells[12], "C");

        assert!(map.contains("C = Your tokens"));
    }

    #[test]
    fn test_victory_explanation_tracks_progress() {
        let mut state = game();
        let crystal = state.board.get_crystal_position();
        for _ in 0..3 {
            state.deploy_token(&p("p1"), 10, crystal).unwrap();
        }
        let text = explain_victory_conditions(&state);
        assert!(text.contains("Win by holding the crystal with 12 tokens for 3 consecutive turns"));
        assert!(text.contains("Alice (Cyan): 3/12 tokens, held for 0/3 turns (needs 9 more token(s))"));
        assert!(text.contains("Generator 1: Uncontested"));
    }

    #[test]
    fn test_situation_report_sections() {
        let mut state = game();
        let report = situation_report(&state, &p("p2"));
        assert!(report.contains("(waiting for other player's turn)"));

        execute_action(&Action::EndTurn, &mut state, &p("p1"));
        let report = situation_report(&state, &p("p2"));
        assert!(report.contains("BOARD MAP (24x24):"));
        assert!(report.contains("AVAILABLE ACTIONS:\n  1. Deploy 10hp token from reserve (5 remaining)"));
        assert!(report.contains("VICTORY CONDITIONS:"));
    }
}
