//! Persistent statistics record
//!
//! One [`StatsRecord`] describes everything run against a stats file:
//! training totals, the most recent evaluation, an append-only history of
//! runs, and the tally of games played by people against the agent. It is loaded and saved through
//! [`crate::ports::StatsRepository`]; nothing in training touches it.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{
    config::TrainConfig,
    pipeline::{MatchReport, OutcomeTally, TrainingMetrics},
    shaping::RewardShaping,
    tictactoe::GameOutcome,
};

/// Seconds since the Unix epoch, or 0 if the clock is before it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Counts and rates of a batch of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
}

impl From<&OutcomeTally> for EvaluationSummary {
    fn from(tally: &OutcomeTally) -> Self {
        Self {
            games: tally.total(),
            wins: tally.wins,
            draws: tally.draws,
            losses: tally.losses,
            win_rate: tally.win_rate(),
            draw_rate: tally.draw_rate(),
            loss_rate: tally.loss_rate(),
        }
    }
}

/// One finished (or cancelled) training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRunRecord {
    /// 1-based, equal to the session count when the run was recorded
    pub run_id: u64,
    pub finished_at: u64,
    pub episodes_requested: usize,
    pub episodes_completed: usize,
    pub cancelled: bool,
    pub final_epsilon: f64,
    pub q_table_size: usize,
    pub opponent_mix: f64,
    pub training: EvaluationSummary,
    pub eval_vs_random: Option<EvaluationSummary>,
    pub eval_vs_heuristic: Option<EvaluationSummary>,
    pub reward_shaping: RewardShaping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingStats {
    pub sessions: u64,
    pub total_episodes: u64,
    /// Unix seconds of the latest recorded session
    pub last_trained: Option<u64>,
    pub last_train_size: usize,
    pub q_table_size: usize,
    pub last_evaluation: Option<EvaluationSummary>,
    pub last_reward_shaping: RewardShaping,
    pub history: Vec<TrainingRunRecord>,
}

impl Default for TrainingStats {
    fn default() -> Self {
        Self {
            sessions: 0,
            total_episodes: 0,
            last_trained: None,
            last_train_size: 0,
            q_table_size: 0,
            last_evaluation: None,
            last_reward_shaping: RewardShaping::default(),
            history: Vec::new(),
        }
    }
}

/// Inputs for [`StatsRecord::record_training_session`].
#[derive(Debug, Clone, Copy)]
pub struct TrainingSession<'a> {
    pub config: &'a TrainConfig,
    pub metrics: &'a TrainingMetrics,
    pub cancelled: bool,
    pub eval_vs_random: Option<&'a OutcomeTally>,
    pub eval_vs_heuristic: Option<&'a OutcomeTally>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideWins {
    pub wins: u64,
    pub wins_started: u64,
    pub wins_second: u64,
}

impl SideWins {
    fn record(&mut self, started: bool) {
        self.wins += 1;
        if started {
            self.wins_started += 1;
        } else {
            self.wins_second += 1;
        }
    }
}

/// Games between a person and the trained agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayStats {
    pub games: u64,
    pub draws: u64,
    pub human: SideWins,
    pub trained: SideWins,
    /// Games in which the agent learned while playing
    pub online_learning_games: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayRecord {
    pub human_vs_trained: PlayStats,
}

/// Process-wide statistics, persisted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsRecord {
    pub play: PlayRecord,
    pub training: TrainingStats,
}

impl StatsRecord {
    /// Fold a session into the totals and append it to the history.
    ///
    /// The evaluation against the random opponent becomes
    /// `last_evaluation`; if there is none the previous value is kept.
    pub fn record_training_session(
        &mut self,
        session: TrainingSession<'_>,
        finished_at: u64,
    ) -> &TrainingRunRecord {
        let training = &mut self.training;
        let metrics = session.metrics;

        training.sessions += 1;
        training.total_episodes += metrics.episodes_completed as u64;
        training.last_trained = Some(finished_at);
        training.last_train_size = metrics.episodes_completed;
        training.q_table_size = metrics.q_table_size;
        training.last_reward_shaping = session.config.reward_shaping;

        let eval_vs_random = session.eval_vs_random.map(EvaluationSummary::from);
        if eval_vs_random.is_some() {
            training.last_evaluation = eval_vs_random;
        }

        training.history.push(TrainingRunRecord {
            run_id: training.sessions,
            finished_at,
            episodes_requested: session.config.episodes,
            episodes_completed: metrics.episodes_completed,
            cancelled: session.cancelled,
            final_epsilon: metrics.final_epsilon,
            q_table_size: metrics.q_table_size,
            opponent_mix: session.config.opponent_mix,
            training: EvaluationSummary::from(&metrics.overall()),
            eval_vs_random,
            eval_vs_heuristic: session.eval_vs_heuristic.map(EvaluationSummary::from),
            reward_shaping: session.config.reward_shaping,
        });
        &training.history[training.history.len() - 1]
    }

    /// Store a standalone evaluation as the latest one.
    pub fn record_evaluation(&mut self, tally: &OutcomeTally) {
        self.training.last_evaluation = Some(EvaluationSummary::from(tally));
    }

    pub fn run(&self, run_id: u64) -> Option<&TrainingRunRecord> {
        self.training.history.iter().find(|r| r.run_id == run_id)
    }

    pub fn runs_newest_first(&self) -> impl Iterator<Item = &TrainingRunRecord> {
        self.training.history.iter().rev()
    }

    /// Count a finished human-vs-agent game.
    pub fn record_play(&mut self, report: &MatchReport, online_learning: bool) {
        let play = &mut self.play.human_vs_trained;
        play.games += 1;
        if online_learning {
            play.online_learning_games += 1;
        }

        let human_started = report.human_started();
        match report.outcome {
            GameOutcome::Draw => play.draws += 1,
            GameOutcome::Win(winner) if winner == report.human_seat => {
                play.human.record(human_started)
            }
            GameOutcome::Win(_) => play.trained.record(!human_started),
        }
    }

    /// Forget all training statistics.
    pub fn reset_training(&mut self) {
        self.training = TrainingStats::default();
    }

    /// Forget all human-vs-agent games.
    pub fn reset_play(&mut self) {
        self.play = PlayRecord::default();
    }
}
