//! Fixed, non-learning opponents

pub mod heuristic;
pub mod random;

use std::fmt;

use clap::ValueEnum;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;

use crate::{
    Result,
    ports::Policy,
    tictactoe::{Board, Player},
};

/// Closed set of fixed opponents, selectable from config files and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
pub enum Opponent {
    Random,
    #[default]
    Heuristic,
}

impl Policy for Opponent {
    fn select_action(
        &self,
        board: &Board,
        player: Player,
        legal: &[usize],
        rng: &mut StdRng,
    ) -> Result<usize> {
        match self {
            Opponent::Random => RandomPolicy.select_action(board, player, legal, rng),
            Opponent::Heuristic => HeuristicPolicy.select_action(board, player, legal, rng),
        }
    }

    fn name(&self) -> &str {
        match self {
            Opponent::Random => "random",
            Opponent::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
