//! Line analysis: wins and immediate threats.

use std::collections::BTreeSet;

use super::{Board, Cell, Player};

/// Every three-in-a-row on the board: rows, then columns, then diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Immediate-win threats on one board, seen from one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThreatReport {
    /// The player can complete a line with their next move.
    pub own: bool,
    /// The opponent can complete a line with their next move.
    pub opponent: bool,
}

impl ThreatReport {
    pub fn for_player(board: &Board, player: Player) -> Self {
        Self {
            own: board.has_immediate_win(player),
            opponent: board.has_immediate_win(player.opponent()),
        }
    }
}

/// Stateless helpers over raw cell arrays
pub struct LineAnalyzer;

impl LineAnalyzer {
    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        let target = player.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// Empty cells that would complete a line for `player`.
    pub fn winning_moves(cells: &[Cell; 9], player: Player) -> BTreeSet<usize> {
        WINNING_LINES
            .iter()
            .filter_map(|line| Self::completing_cell(cells, player, line))
            .collect()
    }

    /// Short-circuits on the first open line, so at most eight line scans.
    pub fn has_immediate_win(cells: &[Cell; 9], player: Player) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| Self::completing_cell(cells, player, line).is_some())
    }

    /// The single empty cell of a line holding two of `player`'s pieces.
    fn completing_cell(cells: &[Cell; 9], player: Player, line: &[usize; 3]) -> Option<usize> {
        let target = player.to_cell();
        let mut own = 0;
        let mut empty = None;

        for &idx in line {
            match cells[idx] {
                Cell::Empty if empty.is_none() => empty = Some(idx),
                c if c == target => own += 1,
                _ => return None,
            }
        }

        if own == 2 { empty } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(s: &str) -> [Cell; 9] {
        Board::from_string(s).unwrap().cells
    }

    #[test]
    fn test_has_won_each_line_kind() {
        assert!(LineAnalyzer::has_won(&cells("XXX......"), Player::X));
        assert!(LineAnalyzer::has_won(&cells("O..O..O.."), Player::O));
        assert!(LineAnalyzer::has_won(&cells("..X.X.X.."), Player::X));
        assert!(!LineAnalyzer::has_won(&cells("XXO......"), Player::X));
    }

    #[test]
    fn test_winning_moves_sorted() {
        // XX.
        // X..
        // ...
        let moves = LineAnalyzer::winning_moves(&cells("XX.X....."), Player::X);
        assert_eq!(moves.into_iter().collect::<Vec<_>>(), vec![2, 6]);
    }

    #[test]
    fn test_two_empty_cells_is_not_a_threat() {
        assert!(!LineAnalyzer::has_immediate_win(&cells("X........"), Player::X));
    }

    #[test]
    fn test_blocked_line_is_not_a_threat() {
        assert!(!LineAnalyzer::has_immediate_win(&cells("XXO......"), Player::X));
        assert!(LineAnalyzer::has_immediate_win(&cells("XX......."), Player::X));
    }

    #[test]
    fn test_threat_report_both_sides() {
        // XX.
        // OO.
        // ...
        let board = Board::from_string("XX.OO....").unwrap();
        let report = ThreatReport::for_player(&board, Player::X);
        assert!(report.own);
        assert!(report.opponent);

        let quiet = ThreatReport::for_player(&Board::new(), Player::O);
        assert_eq!(quiet, ThreatReport::default());
    }
}
