//! Observer port - abstraction for training observation and data collection
//!
//! Observers see the run without being able to change it, so progress bars,
//! JSONL exports and checkpoints can be composed freely.

use crate::{
    Result,
    pipeline::{EpisodeOpponent, MetricsSnapshot, TrainingMetrics},
    q_learning::QAgent,
    tictactoe::MatchResult,
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once
/// 2. For each completed episode:
///    - `on_episode_end(episode, opponent, result)`
///    - `on_snapshot(snapshot, agent)` - every `snapshot_every` episodes
/// 3. `on_training_end(metrics)` - once, also after cancellation
///
/// All methods default to no-ops.
pub trait Observer: Send {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each episode with the result from the learner's seat.
    ///
    /// `episode` is 0-based. For self-play episodes the result is reported
    /// from the side the learner was assigned by the starting-player policy.
    fn on_episode_end(
        &mut self,
        _episode: usize,
        _opponent: EpisodeOpponent,
        _result: MatchResult,
    ) -> Result<()> {
        Ok(())
    }

    /// Called at each periodic snapshot.
    ///
    /// The agent is borrowed read-only; checkpoint observers use it to
    /// export the table at run boundaries rather than per step.
    fn on_snapshot(&mut self, _snapshot: &MetricsSnapshot, _agent: &QAgent) -> Result<()> {
        Ok(())
    }

    /// Called once when the run returns, whether completed or cancelled.
    fn on_training_end(&mut self, _metrics: &TrainingMetrics) -> Result<()> {
        Ok(())
    }
}
