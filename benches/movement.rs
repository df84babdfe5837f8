//! Movement benchmarks: reachability and pathfinding on the standard board.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use race_crystal::game::config::RulesConfig;
use race_crystal::game::movement::{find_path, get_valid_moves};
use race_crystal::{GameState, GridPos, PlayerColor, PlayerId};

fn crowded_game() -> GameState {
    let mut state = GameState::new(RulesConfig::default(), 42);
    let players = [
        ("alice", PlayerColor::Cyan),
        ("bob", PlayerColor::Magenta),
        ("carol", PlayerColor::Yellow),
        ("dave", PlayerColor::Green),
    ];
    for (name, color) in players {
        state
            .add_player(PlayerId::from(name), name, color)
            .expect("add player");
    }
    state.start_game().expect("start game");

    for (index, (name, _)) in players.iter().enumerate() {
        let id = PlayerId::from(*name);
        let zone = state.board.get_deployable_positions(index);
        for (pos, health) in zone.into_iter().zip([10u8, 8, 6, 4]) {
            state.deploy_token(&id, health, pos);
        }
    }
    state
}

fn bench_valid_moves(c: &mut Criterion) {
    let state = crowded_game();
    let alice = PlayerId::from("alice");
    let tokens = state.get_player_tokens(&alice);
    let slow = tokens
        .iter()
        .find(|t| t.movement_range() == 1)
        .map(|t| (*t).clone())
        .expect("slow token");
    let fast = tokens
        .iter()
        .find(|t| t.movement_range() == 2)
        .map(|t| (*t).clone())
        .expect("fast token");

    c.bench_function("valid_moves_range_1", |b| {
        b.iter(|| get_valid_moves(black_box(&slow), &state.board, &state.tokens))
    });
    c.bench_function("valid_moves_range_2", |b| {
        b.iter(|| get_valid_moves(black_box(&fast), &state.board, &state.tokens))
    });
}

fn bench_find_path(c: &mut Criterion) {
    let state = crowded_game();
    let crystal = state.board.get_crystal_position();

    c.bench_function("find_path_corner_to_crystal", |b| {
        b.iter(|| find_path(black_box(GridPos::new(0, 0)), black_box(crystal), &state.board, 48))
    });
}

criterion_group!(benches, bench_valid_moves, bench_find_path);
criterion_main!(benches);
