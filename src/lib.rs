//! Tabular Q-learning for Tic-Tac-Toe
//!
//! This crate provides:
//! - Tic-Tac-Toe rules, threat analysis and a step environment
//! - Fixed opponents (random, heuristic) behind a common policy trait
//! - A Q-learning agent sharing one table between both seats through
//!   canonical, side-to-move-relative states
//! - Reward shaping with optional tactical bonuses
//! - A curriculum trainer mixing self-play with fixed-opponent games, and
//!   a read-only evaluator
//! - File and in-memory persistence for Q-tables and run statistics

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod policies;
pub mod ports;
pub mod q_learning;
pub mod shaping;
pub mod stats;
pub mod tictactoe;
pub mod types;

pub use config::{StartingPlayer, TrainConfig};
pub use error::{Error, Result};
pub use pipeline::{
    CurriculumTrainer, Evaluator, OutcomeTally, TrainingMetrics, TrainingOutcome, train,
};
pub use policies::Opponent;
pub use q_learning::{QAgent, QAgentConfig, QTableSnapshot, SavedQAgent};
pub use shaping::RewardShaping;
pub use stats::StatsRecord;
pub use types::CanonicalState;
