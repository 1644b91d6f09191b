//! Observer implementations for training runs
//!
//! Observers collect data during training without coupling the training
//! loop to any output format.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::{EpisodeOpponent, MetricsSnapshot, OutcomeTally, TrainingMetrics};
use crate::{
    Result,
    ports::{Observer, QTableRepository},
    q_learning::QAgent,
    tictactoe::MatchResult,
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    tally: OutcomeTally,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            tally: OutcomeTally::default(),
        }
    }

    fn message(&self) -> String {
        format!(
            "{} D:{} L:{}",
            self.tally.wins, self.tally.draws, self.tally.losses
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (W:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(
        &mut self,
        episode: usize,
        _opponent: EpisodeOpponent,
        result: MatchResult,
    ) -> Result<()> {
        self.tally.record(result);
        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self, _metrics: &TrainingMetrics) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// JSONL observer - Writes each metrics snapshot as one JSON line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_snapshot(&mut self, snapshot: &MetricsSnapshot, _agent: &QAgent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self, _metrics: &TrainingMetrics) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Saves the agent's table through a repository at every snapshot, never
/// per step. Each save replaces the previous checkpoint.
pub struct CheckpointObserver<R: QTableRepository> {
    repository: R,
    path: PathBuf,
    saved: usize,
}

impl<R: QTableRepository> CheckpointObserver<R> {
    pub fn new(repository: R, path: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            path: path.into(),
            saved: 0,
        }
    }

    /// Number of checkpoints written so far
    pub fn checkpoints_written(&self) -> usize {
        self.saved
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R: QTableRepository + Send> Observer for CheckpointObserver<R> {
    fn on_snapshot(&mut self, snapshot: &MetricsSnapshot, agent: &QAgent) -> Result<()> {
        self.repository.save(&self.path, &agent.export())?;
        self.saved += 1;
        debug!(
            episode = snapshot.episode,
            path = %self.path.display(),
            "checkpoint saved"
        );
        Ok(())
    }
}
