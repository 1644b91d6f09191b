//! Game outcomes and per-player results

use serde::{Deserialize, Serialize};

use super::board::Player;

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    pub fn from_winner(winner: Option<Player>) -> Self {
        winner.map_or(GameOutcome::Draw, GameOutcome::Win)
    }

    /// The outcome as experienced by `player`.
    pub fn result_for(self, player: Player) -> MatchResult {
        match self {
            GameOutcome::Win(winner) if winner == player => MatchResult::Win,
            GameOutcome::Win(_) => MatchResult::Loss,
            GameOutcome::Draw => MatchResult::Draw,
        }
    }
}

/// A game result from one participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_for_each_side() {
        let outcome = GameOutcome::from_winner(Some(Player::O));
        assert_eq!(outcome.result_for(Player::O), MatchResult::Win);
        assert_eq!(outcome.result_for(Player::X), MatchResult::Loss);

        let draw = GameOutcome::from_winner(None);
        assert_eq!(draw.result_for(Player::X), MatchResult::Draw);
        assert_eq!(draw.result_for(Player::O), MatchResult::Draw);
    }
}
