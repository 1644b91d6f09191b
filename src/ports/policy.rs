//! Policy port - anything that can pick a move

use rand::rngs::StdRng;

use crate::{
    Result,
    tictactoe::{Board, Player},
};

/// Action selection capability shared by fixed opponents and the learned agent.
///
/// Policies never mutate the board and never learn through this trait. The
/// random source is passed in so a whole training or evaluation run draws
/// from one seedable generator; deterministic policies simply ignore it.
///
/// # Examples
///
/// ```no_run
/// use qttt::{ports::Policy, tictactoe::{Board, Player}};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// fn opening_move<P: Policy>(policy: &P) -> qttt::Result<usize> {
///     let board = Board::new();
///     let mut rng = StdRng::seed_from_u64(7);
///     policy.select_action(&board, Player::X, &board.legal_actions(), &mut rng)
/// }
/// ```
pub trait Policy {
    /// Choose one of `legal` for `player` to play on `board`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalActions`] when `legal` is empty.
    fn select_action(
        &self,
        board: &Board,
        player: Player,
        legal: &[usize],
        rng: &mut StdRng,
    ) -> Result<usize>;

    /// Short name used in logs and reports.
    fn name(&self) -> &str;
}
