//! Tic-Tac-Toe rules: board, line analysis and the environment

pub mod board;
pub mod env;
pub mod game;
pub mod lines;

pub use board::{BOARD_CELLS, Board, Cell, Player};
pub use env::{Environment, RAW_WIN_REWARD, Transition};
pub use game::{GameOutcome, MatchResult};
pub use lines::{LineAnalyzer, ThreatReport, WINNING_LINES};
