//! Board state representation and basic operations

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;
use crate::{Error, Result, types::CanonicalState};

/// Number of cells on the 3x3 board
pub const BOARD_CELLS: usize = 9;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '_' | '-' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    /// Signed encoding of the cell: X = +1, O = -1, empty = 0.
    pub fn value(self) -> i8 {
        match self {
            Cell::Empty => 0,
            Cell::X => 1,
            Cell::O => -1,
        }
    }

    /// Inverse of [`Cell::value`]. Any value other than -1, 0 or 1 yields `None`.
    pub fn from_value(value: i8) -> Option<Cell> {
        match value {
            0 => Some(Cell::Empty),
            1 => Some(Cell::X),
            -1 => Some(Cell::O),
            _ => None,
        }
    }

    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }
}

/// A player in the game. X always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    /// Sign used to move a board into this player's reference frame.
    pub fn sign(self) -> i8 {
        match self {
            Player::X => 1,
            Player::O => -1,
        }
    }

    /// Stable slot for per-player arrays.
    pub fn index(self) -> usize {
        match self {
            Player::X => 0,
            Player::O => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// Board cells in row-major order.
///
/// Boards are values: every transition produces a new `Board` and the
/// original is never touched. The type is `Copy` since it is only 9 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    pub cells: [Cell; BOARD_CELLS],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_CELLS],
        }
    }

    pub fn from_cells(cells: [Cell; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    /// Parse a board from 9 cell characters (`X`, `O`, `.`); whitespace and
    /// `|` separators are ignored so rendered boards can be pasted back in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBoard`] if the input does not contain exactly
    /// 9 valid cells.
    pub fn from_string(s: &str) -> Result<Self> {
        let chars: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .collect();
        if chars.len() != BOARD_CELLS {
            return Err(Error::InvalidBoard {
                input: s.to_string(),
                reason: format!("expected {BOARD_CELLS} cells, got {}", chars.len()),
            });
        }

        let mut cells = [Cell::Empty; BOARD_CELLS];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| Error::InvalidBoard {
                input: s.to_string(),
                reason: format!("invalid character '{c}' at position {i}"),
            })?;
        }
        Ok(Self { cells })
    }

    /// Rebuild the physical board from a state seen by `player`.
    pub fn from_canonical(state: &CanonicalState, player: Player) -> Self {
        let mut cells = [Cell::Empty; BOARD_CELLS];
        for (cell, &value) in cells.iter_mut().zip(state.values()) {
            // CanonicalState guarantees values in {-1, 0, 1}
            *cell = Cell::from_value(value * player.sign()).unwrap_or(Cell::Empty);
        }
        Self { cells }
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    /// Check if a position is empty
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Legal actions (empty cells while the game is still running)
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.empty_positions()
    }

    /// Count the number of occupied cells on the board.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Empty).count()
    }

    /// Place `player`'s piece at `pos` and return the new board.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] if `pos` is out of range or occupied.
    #[must_use = "place returns a new board; the original is unchanged"]
    pub fn place(&self, pos: usize, player: Player) -> Result<Board> {
        if pos >= BOARD_CELLS || !self.is_empty(pos) {
            return Err(Error::InvalidAction { position: pos });
        }
        let mut next = *self;
        next.cells[pos] = player.to_cell();
        Ok(next)
    }

    /// Swap X and O pieces on the board.
    #[must_use = "swap_players returns a new board; the original is unchanged"]
    pub fn swap_players(&self) -> Self {
        let mut swapped = *self;
        for cell in &mut swapped.cells {
            *cell = match cell {
                Cell::X => Cell::O,
                Cell::O => Cell::X,
                Cell::Empty => Cell::Empty,
            };
        }
        swapped
    }

    /// Check if a player has won
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        if self.has_won(Player::X) {
            Some(Player::X)
        } else if self.has_won(Player::O) {
            Some(Player::O)
        } else {
            None
        }
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Check if the game is over (win or draw)
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// Check if the position is a draw (all cells filled, no winner)
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    /// Whether `player` could complete a line with a single move.
    pub fn has_immediate_win(&self, player: Player) -> bool {
        LineAnalyzer::has_immediate_win(&self.cells, player)
    }

    /// Cells that would complete a line for `player`, ascending.
    pub fn winning_moves(&self, player: Player) -> BTreeSet<usize> {
        LineAnalyzer::winning_moves(&self.cells, player)
    }

    /// Board in `player`'s reference frame: every cell multiplied by the
    /// player's sign, so the mover's own pieces are always `+1`.
    pub fn canonical(&self, player: Player) -> CanonicalState {
        let sign = player.sign();
        let mut values = [0i8; BOARD_CELLS];
        for (value, cell) in values.iter_mut().zip(self.cells.iter()) {
            *value = cell.value() * sign;
        }
        CanonicalState::from_signed(values)
    }

    /// Compact single-line encoding, e.g. `X.O......`
    pub fn encode(&self) -> String {
        self.cells.iter().map(|&c| c.to_char()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            let base = row * 3;
            writeln!(
                f,
                " {} | {} | {} ",
                self.cells[base].to_char(),
                self.cells[base + 1].to_char(),
                self.cells[base + 2].to_char()
            )?;
            if row < 2 {
                writeln!(f, "---+---+---")?;
            }
        }
        Ok(())
    }
}
