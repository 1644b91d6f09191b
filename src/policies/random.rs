//! Uniform random baseline

use rand::{prelude::IndexedRandom, rngs::StdRng};

use crate::{
    Error, Result,
    ports::Policy,
    tictactoe::{Board, Player},
};

/// Picks uniformly among the legal actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn select_action(
        &self,
        _board: &Board,
        _player: Player,
        legal: &[usize],
        rng: &mut StdRng,
    ) -> Result<usize> {
        legal.choose(rng).copied().ok_or(Error::NoLegalActions)
    }

    fn name(&self) -> &str {
        "random"
    }
}
