//! Shared helpers for the integration tests.

#![allow(dead_code)]

use qttt::{TrainConfig, tictactoe::Board};

/// Short seeded run with snapshots small enough to observe.
pub fn quick_config(episodes: usize, seed: u64) -> TrainConfig {
    TrainConfig::default()
        .with_episodes(episodes)
        .with_seed(seed)
        .with_snapshot_every(50)
}

/// Play `moves` alternately starting with X.
pub fn board_after(moves: &[usize]) -> Board {
    let mut board = Board::new();
    let mut player = qttt::tictactoe::Player::X;
    for &pos in moves {
        board = board.place(pos, player).unwrap();
        player = player.opponent();
    }
    board
}
