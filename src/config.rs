//! Training configuration.

use std::{fs, path::Path};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, policies::Opponent, q_learning::QAgentConfig, shaping::RewardShaping,
    tictactoe::Player,
};

/// Which seat the learner takes. X always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StartingPlayer {
    /// Learner plays X in every game
    #[default]
    Agent,
    /// Learner plays O in every game
    Opponent,
    /// Learner plays X in even-numbered games and O in odd ones
    Alternate,
}

impl StartingPlayer {
    /// Seat of the learner in game `index` (0-based).
    pub fn agent_seat(self, index: usize) -> Player {
        match self {
            StartingPlayer::Agent => Player::X,
            StartingPlayer::Opponent => Player::O,
            StartingPlayer::Alternate if index % 2 == 0 => Player::X,
            StartingPlayer::Alternate => Player::O,
        }
    }
}

/// Everything a training run needs.
///
/// Missing fields in a JSON file fall back to the defaults below.
///
/// # Examples
///
/// ```
/// use qttt::{TrainConfig, policies::Opponent};
///
/// let config = TrainConfig::default()
///     .with_episodes(500)
///     .with_opponent_mix(1.0)
///     .with_curriculum_opponent(Opponent::Random)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of episodes to play
    pub episodes: usize,
    /// Probability that an episode uses the fixed opponent instead of self-play
    pub opponent_mix: f64,
    pub reward_shaping: RewardShaping,
    pub agent: QAgentConfig,
    /// Fixed opponent used in curriculum episodes
    pub curriculum_opponent: Opponent,
    pub starting_player: StartingPlayer,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Episodes between metrics snapshots
    pub snapshot_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            episodes: 10_000,
            opponent_mix: 0.3,
            reward_shaping: RewardShaping::default(),
            agent: QAgentConfig::default(),
            curriculum_opponent: Opponent::Heuristic,
            starting_player: StartingPlayer::Agent,
            seed: None,
            snapshot_every: 200,
        }
    }
}

impl TrainConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_opponent_mix(mut self, mix: f64) -> Self {
        self.opponent_mix = mix;
        self
    }

    pub fn with_reward_shaping(mut self, shaping: RewardShaping) -> Self {
        self.reward_shaping = shaping;
        self
    }

    pub fn with_agent(mut self, agent: QAgentConfig) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_curriculum_opponent(mut self, opponent: Opponent) -> Self {
        self.curriculum_opponent = opponent;
        self
    }

    pub fn with_starting_player(mut self, starting: StartingPlayer) -> Self {
        self.starting_player = starting;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_snapshot_every(mut self, every: usize) -> Self {
        self.snapshot_every = every;
        self
    }

    /// Load a JSON config file; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Serialization`] if it is not valid JSON for this type.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Check every option before any episode runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first bad option.
    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(Error::config("episodes must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.opponent_mix) {
            return Err(Error::config(format!(
                "opponent_mix must be in [0, 1], got {}",
                self.opponent_mix
            )));
        }
        if self.snapshot_every == 0 {
            return Err(Error::config("snapshot_every must be greater than 0"));
        }
        self.agent.validate()?;
        self.reward_shaping.validate()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrainConfig::default();
        assert_eq!(config.episodes, 10_000);
        assert_eq!(config.opponent_mix, 0.3);
        assert_eq!(config.snapshot_every, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            TrainConfig::default().with_episodes(0),
            TrainConfig::default().with_opponent_mix(1.5),
            TrainConfig::default().with_opponent_mix(-0.1),
            TrainConfig::default().with_opponent_mix(f64::NAN),
            TrainConfig::default().with_snapshot_every(0),
            TrainConfig::default().with_agent(QAgentConfig {
                alpha: 0.0,
                ..QAgentConfig::default()
            }),
            TrainConfig::default().with_reward_shaping(RewardShaping {
                win_reward: f64::NAN,
                ..RewardShaping::default()
            }),
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_partial_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("train.json");
        fs::write(
            &path,
            r#"{
                "episodes": 50,
                "opponent_mix": 1.0,
                "agent": { "alpha": 0.3 },
                "curriculum_opponent": "random",
                "starting_player": "alternate"
            }"#,
        )
        .unwrap();

        let config = TrainConfig::from_json_file(&path).unwrap();
        assert_eq!(config.episodes, 50);
        assert_eq!(config.agent.alpha, 0.3);
        assert_eq!(config.agent.gamma, 0.98);
        assert_eq!(config.curriculum_opponent, Opponent::Random);
        assert_eq!(config.starting_player, StartingPlayer::Alternate);
        assert_eq!(config.reward_shaping, RewardShaping::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = TrainConfig::from_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_agent_seat() {
        assert_eq!(StartingPlayer::Agent.agent_seat(3), Player::X);
        assert_eq!(StartingPlayer::Opponent.agent_seat(0), Player::O);
        assert_eq!(StartingPlayer::Alternate.agent_seat(0), Player::X);
        assert_eq!(StartingPlayer::Alternate.agent_seat(1), Player::O);
    }
}
