//! Pure state-transition function shared by training, evaluation and play.

use super::{Board, GameOutcome, Player};
use crate::{Error, Result};

/// Raw reward for the move that completes a line. Every other move,
/// including the one that fills the board for a draw, earns `0.0`.
pub const RAW_WIN_REWARD: f64 = 1.0;

/// Result of applying one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub board: Board,
    pub done: bool,
    pub winner: Option<Player>,
    /// Raw reward from the mover's point of view.
    pub reward: f64,
}

impl Transition {
    /// The game outcome, if this transition ended it.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.done.then(|| GameOutcome::from_winner(self.winner))
    }
}

/// Tic-Tac-Toe environment. Holds no game state; every call is a pure
/// function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl Environment {
    pub fn new() -> Self {
        Self
    }

    pub fn reset(&self) -> Board {
        Board::new()
    }

    /// Place `player`'s piece at `action` on a copy of `board`.
    ///
    /// # Errors
    ///
    /// * [`Error::GameOver`] if `board` is already terminal.
    /// * [`Error::InvalidAction`] if `action` is out of range or occupied.
    ///
    /// In both cases `board` is left unchanged.
    pub fn step(&self, board: &Board, action: usize, player: Player) -> Result<Transition> {
        if board.is_terminal() {
            return Err(Error::GameOver);
        }

        let next = board.place(action, player)?;
        let winner = next.winner();
        let done = winner.is_some() || next.is_full();
        let reward = if winner == Some(player) {
            RAW_WIN_REWARD
        } else {
            0.0
        };

        Ok(Transition {
            board: next,
            done,
            winner,
            reward,
        })
    }
}
