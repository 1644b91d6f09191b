//! Rule-based opponent: win, block, centre, corner, anything.

use rand::rngs::StdRng;

use crate::{
    Error, Result,
    ports::Policy,
    tictactoe::{Board, Player},
};

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Deterministic priority policy.
///
/// In order: complete an own line, block an opponent line, take the centre,
/// take a corner, take any legal cell. Within each rule the lowest cell index
/// wins, so the same board always yields the same move.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    fn first_in<'a>(
        candidates: impl IntoIterator<Item = &'a usize>,
        legal: &[usize],
    ) -> Option<usize> {
        candidates.into_iter().copied().find(|c| legal.contains(c))
    }
}

impl Policy for HeuristicPolicy {
    fn select_action(
        &self,
        board: &Board,
        player: Player,
        legal: &[usize],
        _rng: &mut StdRng,
    ) -> Result<usize> {
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }

        let wins = board.winning_moves(player);
        let blocks = board.winning_moves(player.opponent());

        Self::first_in(&wins, legal)
            .or_else(|| Self::first_in(&blocks, legal))
            .or_else(|| Self::first_in(&[CENTER], legal))
            .or_else(|| Self::first_in(&CORNERS, legal))
            .or_else(|| legal.iter().copied().min())
            .ok_or(Error::NoLegalActions)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
