//! Race to the Crystal Server
//!
//! Runs a scripted two-player game against the rules engine and replays it
//! to check that the final state hash is reproducible.
//!
//! Usage: `race-crystal-server [rules.json]`, seed from `RACE_CRYSTAL_SEED`.

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use race_crystal::{
    VERSION,
    game::{
        actions::{execute_action, Action},
        config::RulesConfig,
        events::GameEventData,
        observation::{board_map, list_available_actions, AvailableAction},
        player::{PlayerColor, PlayerId},
        state::GameState,
    },
    GridPos,
};

/// Seed used when `RACE_CRYSTAL_SEED` is unset.
const DEFAULT_SEED: u64 = 12345;

/// Demo stops here if nobody has won.
const MAX_DEMO_TURNS: u32 = 200;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Race to the Crystal Server v{}", VERSION);

    let rules = load_rules(std::env::args().nth(1))?;
    let seed = load_seed()?;
    info!(
        "Board {}x{}, {} tokens per player, seed {}",
        rules.board.width,
        rules.board.height,
        rules.tokens_per_player(),
        seed
    );

    demo_game(rules, seed)
}

fn load_rules(path: Option<String>) -> Result<RulesConfig> {
    let Some(path) = path else {
        return Ok(RulesConfig::default());
    };
    let json = std::fs::read_to_string(&path).with_context(|| format!("reading rules file {}", path))?;
    let rules = RulesConfig::from_json(&json).with_context(|| format!("parsing rules file {}", path))?;
    rules.board.validate().with_context(|| format!("rules file {}", path))?;
    if rules.board.width < 3 || rules.board.height < 3 {
        bail!("board {}x{} is too small", rules.board.width, rules.board.height);
    }
    Ok(rules)
}

fn load_seed() -> Result<u64> {
    match std::env::var("RACE_CRYSTAL_SEED") {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("RACE_CRYSTAL_SEED is not a u64: {:?}", raw)),
        Err(_) => Ok(DEFAULT_SEED),
    }
}

fn new_game(rules: &RulesConfig, seed: u64, players: &[(PlayerId, &str, PlayerColor)]) -> Result<GameState> {
    let mut state = GameState::new(rules.clone(), seed);
    for (id, name, color) in players {
        state.add_player(id.clone(), *name, *color)?;
    }
    state.start_game()?;
    Ok(state)
}

/// Demo function to exercise the rules.
fn demo_game(rules: RulesConfig, seed: u64) -> Result<()> {
    info!("=== Starting Demo Game ===");

    let players = [
        (PlayerId::from("alice"), "Alice", PlayerColor::Cyan),
        (PlayerId::from("bob"), "Bob", PlayerColor::Magenta),
    ];
    let mut state = new_game(&rules, seed, &players)?;
    let crystal = state.board.get_crystal_position();
    info!("Crystal at {}, mystery squares: {}", crystal, state.board.get_mystery_positions().len());

    let mut log: Vec<(PlayerId, Action)> = Vec::new();

    while !state.is_ended() && state.turn_number <= MAX_DEMO_TURNS {
        let Some(player_id) = state.current_turn_player_id.clone() else {
            break;
        };
        let mut action = choose_action(&state, &player_id, crystal);
        let mut result = execute_action(&action, &mut state, &player_id);
        if !result.success {
            warn!("Bot action refused: {}", result.message);
            action = Action::EndTurn;
            result = execute_action(&action, &mut state, &player_id);
        }
        debug!("{}: {}", player_id, result.message.replace('\n', " | "));

        for event in &result.events {
            match &event.data {
                GameEventData::TokenKilled { token_id, position, .. } => {
                    info!("Turn {}: token {} killed at {}", event.turn, token_id, position);
                }
                GameEventData::GeneratorDisabled { generator_id, player_id, .. } => {
                    info!("Turn {}: generator {} disabled by {:?}", event.turn, generator_id, player_id);
                }
                GameEventData::GameWon { winner_id, turn_number } => {
                    info!("Game won by {} on turn {}", winner_id, turn_number);
                }
                _ => {}
            }
        }

        log.push((player_id, action));
    }

    // Print final results
    info!("=== Game Results ===");
    info!("Actions played: {}", log.len());
    match state.check_win_condition() {
        Some(winner) => info!("Winner: {}", winner),
        None => info!("No winner after {} turns", MAX_DEMO_TURNS),
    }
    info!("\n{}", board_map(&state, &players[0].0));

    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let mut replay = new_game(&rules, seed, &players)?;
    for (player_id, action) in &log {
        let result = execute_action(action, &mut replay, player_id);
        if !result.success {
            bail!("replay diverged: {}", result.message);
        }
    }

    let replay_hash = replay.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        bail!("DETERMINISM FAILURE: Hashes differ!")
    }
}

/// Greedy bot: deploy while the reserve lasts, walk toward the crystal,
/// attack whatever is adjacent.
fn choose_action(state: &GameState, player_id: &PlayerId, crystal: GridPos) -> Action {
    let available = list_available_actions(state, player_id);

    for option in &available.actions {
        match option {
            AvailableAction::Attack { attacker_id, defender_id, .. } => {
                return Action::Attack {
                    attacker_id: *attacker_id,
                    defender_id: *defender_id,
                };
            }
            AvailableAction::Deploy { health_value, positions, .. } => {
                if let Some(position) = positions.first() {
                    return Action::Deploy {
                        health_value: *health_value,
                        position: *position,
                    };
                }
            }
            _ => {}
        }
    }

    let best_move = available
        .actions
        .iter()
        .filter_map(|option| match option {
            AvailableAction::Move { token_id, token_position, valid_destinations, .. } => valid_destinations
                .iter()
                .min_by_key(|pos| pos.chebyshev(crystal))
                .filter(|pos| pos.chebyshev(crystal) < token_position.chebyshev(crystal))
                .map(|pos| (pos.chebyshev(crystal), *token_id, *pos)),
            _ => None,
        })
        .min();

    match best_move {
        Some((_, token_id, destination)) => Action::Move { token_id, destination },
        None => Action::EndTurn,
    }
}
