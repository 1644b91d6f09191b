//! Training and evaluation pipeline
//!
//! - [`CurriculumTrainer`]: mixes self-play with fixed-opponent episodes
//! - [`Evaluator`]: read-only matches against a fixed opponent
//! - [`HumanMatch`]: one game against a person, optionally learning from it
//! - observers: progress bars, JSONL snapshots, checkpoints

pub mod cancellation;
pub mod curriculum;
pub mod evaluation;
pub mod metrics;
pub mod observers;
pub mod play;
pub mod training;

pub use cancellation::CancellationToken;
pub use curriculum::EpisodeOpponent;
pub use evaluation::{Evaluator, MultiRunEvaluation, RateSummary};
pub use metrics::{MetricsSnapshot, OutcomeTally, TrainingMetrics};
pub use observers::{CheckpointObserver, JsonlObserver, ProgressObserver};
pub use play::{HumanMatch, MatchReport};
pub use training::{CurriculumTrainer, TrainingOutcome, train};

pub use crate::ports::Observer;
