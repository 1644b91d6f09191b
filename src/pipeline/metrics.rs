//! Training and evaluation tallies

use serde::{Deserialize, Serialize};

use super::EpisodeOpponent;
use crate::{q_learning::QAgent, tictactoe::MatchResult};

/// Win/draw/loss counts from the learner's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl OutcomeTally {
    pub fn new(wins: usize, draws: usize, losses: usize) -> Self {
        Self {
            wins,
            draws,
            losses,
        }
    }

    pub fn record(&mut self, result: MatchResult) {
        match result {
            MatchResult::Win => self.wins += 1,
            MatchResult::Draw => self.draws += 1,
            MatchResult::Loss => self.losses += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    fn rate(&self, count: usize) -> f64 {
        let total = self.total();
        if total > 0 {
            count as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }
}

/// Periodic view of a running training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Episodes completed when the snapshot was taken
    pub episode: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub epsilon: f64,
    /// Visited canonical states
    pub q_table_size: usize,
}

/// Accumulated results of one training run.
///
/// Overall counts are taken from the learner's assigned seat; `self_play`
/// and `vs_fixed` split the same counts by episode type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub episodes_completed: usize,
    pub final_epsilon: f64,
    pub q_table_size: usize,
    pub self_play: OutcomeTally,
    pub vs_fixed: OutcomeTally,
    pub snapshots: Vec<MetricsSnapshot>,
}

impl TrainingMetrics {
    pub fn record(&mut self, opponent: EpisodeOpponent, result: MatchResult) {
        match result {
            MatchResult::Win => self.wins += 1,
            MatchResult::Draw => self.draws += 1,
            MatchResult::Loss => self.losses += 1,
        }
        match opponent {
            EpisodeOpponent::SelfPlay => self.self_play.record(result),
            EpisodeOpponent::Fixed(_) => self.vs_fixed.record(result),
        }
        self.episodes_completed += 1;
    }

    pub fn overall(&self) -> OutcomeTally {
        OutcomeTally::new(self.wins, self.draws, self.losses)
    }

    pub(crate) fn snapshot(&self, agent: &QAgent) -> MetricsSnapshot {
        MetricsSnapshot {
            episode: self.episodes_completed,
            wins: self.wins,
            draws: self.draws,
            losses: self.losses,
            epsilon: agent.epsilon(),
            q_table_size: agent.state_count(),
        }
    }

    pub(crate) fn finish(&mut self, agent: &QAgent) {
        self.final_epsilon = agent.epsilon();
        self.q_table_size = agent.state_count();
    }
}
