//! Tabular Q-learning agent
//!
//! One agent owns one [`QTable`]. During self-play the same agent plays both
//! seats; canonical states keep the two seats' experience consistent.

use rand::{Rng, prelude::IndexedRandom, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{QTable, QTableSnapshot, schedule::EpsilonSchedule};
use crate::{
    Error, Result,
    ports::Policy,
    tictactoe::{Board, Player},
    types::CanonicalState,
};

/// Learning hyperparameters and exploration schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QAgentConfig {
    /// Learning rate α in (0, 1]
    pub alpha: f64,
    /// Discount factor γ in [0, 1]
    pub gamma: f64,
    pub epsilon_start: f64,
    pub epsilon_min: f64,
    /// Multiplicative decay per episode in (0, 1]
    pub epsilon_decay: f64,
}

impl Default for QAgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.15,
            gamma: 0.98,
            epsilon_start: 1.0,
            epsilon_min: 0.02,
            epsilon_decay: 0.998,
        }
    }
}

impl QAgentConfig {
    pub fn schedule(&self) -> EpsilonSchedule {
        EpsilonSchedule::new(self.epsilon_start, self.epsilon_min, self.epsilon_decay)
    }

    /// Check every hyperparameter range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::config(format!("alpha must be in (0, 1], got {}", self.alpha)));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::config(format!("gamma must be in [0, 1], got {}", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return Err(Error::config(format!(
                "epsilon_start must be in [0, 1], got {}",
                self.epsilon_start
            )));
        }
        if !(0.0..=self.epsilon_start).contains(&self.epsilon_min) {
            return Err(Error::config(format!(
                "epsilon_min must be in [0, epsilon_start={}], got {}",
                self.epsilon_start, self.epsilon_min
            )));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::config(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            )));
        }
        Ok(())
    }
}

/// Epsilon-greedy tabular Q-learning agent
#[derive(Debug, Clone, PartialEq)]
pub struct QAgent {
    table: QTable,
    config: QAgentConfig,
    epsilon: f64,
    episodes_decayed: u64,
}

impl QAgent {
    pub fn new(config: QAgentConfig) -> Self {
        Self {
            table: QTable::new(config.alpha, config.gamma),
            config,
            epsilon: config.epsilon_start,
            episodes_decayed: 0,
        }
    }

    /// Rebuild an agent part-way through its schedule.
    pub(crate) fn resumed(config: QAgentConfig, episodes_decayed: u64) -> Self {
        let mut agent = Self::new(config);
        agent.episodes_decayed = episodes_decayed;
        agent.epsilon = config.schedule().value_at(episodes_decayed);
        agent
    }

    pub fn config(&self) -> &QAgentConfig {
        &self.config
    }

    /// Current exploration probability
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of times [`QAgent::decay_epsilon`] has run.
    pub fn episodes_decayed(&self) -> u64 {
        self.episodes_decayed
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn q_value(&self, state: &CanonicalState, action: usize) -> f64 {
        self.table.get(state, action)
    }

    /// Number of visited canonical states
    pub fn state_count(&self) -> usize {
        self.table.state_count()
    }

    /// Epsilon-greedy choice among `legal`.
    ///
    /// With `training` off, or when the exploration draw fails, this is the
    /// greedy action with ties broken toward the lowest index. The
    /// exploration draw only consumes randomness while training.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] when `legal` is empty.
    pub fn select_action(
        &self,
        state: &CanonicalState,
        legal: &[usize],
        training: bool,
        rng: &mut StdRng,
    ) -> Result<usize> {
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }
        if training && rng.random::<f64>() < self.epsilon {
            return legal.choose(rng).copied().ok_or(Error::NoLegalActions);
        }
        self.greedy_action(state, legal)
    }

    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] when `legal` is empty.
    pub fn greedy_action(&self, state: &CanonicalState, legal: &[usize]) -> Result<usize> {
        self.table
            .greedy_action(state, legal)
            .ok_or(Error::NoLegalActions)
    }

    /// TD update for `(state, action)`.
    ///
    /// The next state's legal actions are its empty cells. When `done` the
    /// bootstrap term is omitted and `next_state` is ignored.
    pub fn update(
        &mut self,
        state: &CanonicalState,
        action: usize,
        reward: f64,
        next_state: &CanonicalState,
        done: bool,
    ) {
        let next_legal = if done {
            Vec::new()
        } else {
            next_state.empty_cells()
        };
        self.table
            .q_learning_update(*state, action, reward, next_state, &next_legal, done);
    }

    /// Advance the exploration schedule by one episode.
    pub fn decay_epsilon(&mut self) {
        self.episodes_decayed += 1;
        self.epsilon = self.config.schedule().value_at(self.episodes_decayed);
    }

    /// Copy every stored value into a serialisable snapshot.
    pub fn export(&self) -> QTableSnapshot {
        QTableSnapshot::from_table(&self.table)
    }

    /// Replace the table with the contents of `snapshot`.
    ///
    /// Epsilon and hyperparameters are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptData`] if a key, action or value is invalid.
    /// The current table is untouched on error.
    pub fn load(&mut self, snapshot: &QTableSnapshot) -> Result<()> {
        let mut table = QTable::new(self.config.alpha, self.config.gamma);
        snapshot.fill_table(&mut table)?;
        self.table = table;
        Ok(())
    }
}

impl Default for QAgent {
    fn default() -> Self {
        Self::new(QAgentConfig::default())
    }
}

/// Greedy play through the shared policy interface; never explores.
impl Policy for QAgent {
    fn select_action(
        &self,
        board: &Board,
        player: Player,
        legal: &[usize],
        rng: &mut StdRng,
    ) -> Result<usize> {
        QAgent::select_action(self, &board.canonical(player), legal, false, rng)
    }

    fn name(&self) -> &str {
        "q-agent"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn state(values: [i8; 9]) -> CanonicalState {
        CanonicalState::new(values).unwrap()
    }

    #[test]
    fn test_default_hyperparameters() {
        let agent = QAgent::default();
        assert_eq!(agent.config().alpha, 0.15);
        assert_eq!(agent.config().gamma, 0.98);
        assert_eq!(agent.epsilon(), 1.0);
    }

    #[test]
    fn test_greedy_selection_is_deterministic() {
        let mut agent = QAgent::new(QAgentConfig {
            epsilon_start: 0.0,
            epsilon_min: 0.0,
            ..QAgentConfig::default()
        });
        let s = CanonicalState::empty();
        agent.update(&s, 6, 1.0, &s, true);
        agent.update(&s, 2, 1.0, &s, true);

        let legal = s.empty_cells();
        let mut rng = StdRng::seed_from_u64(42);
        let first = agent.select_action(&s, &legal, true, &mut rng).unwrap();
        for _ in 0..50 {
            assert_eq!(agent.select_action(&s, &legal, true, &mut rng).unwrap(), first);
        }
        assert_eq!(first, 2);
    }

    #[test]
    fn test_unseen_state_picks_lowest_legal() {
        let agent = QAgent::default();
        let mut rng = StdRng::seed_from_u64(0);
        let s = state([1, -1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(agent.select_action(&s, &[8, 3, 5], false, &mut rng).unwrap(), 3);
    }

    #[test]
    fn test_full_exploration_stays_legal() {
        let agent = QAgent::default();
        let mut rng = StdRng::seed_from_u64(9);
        let legal = [1, 5, 7];
        for _ in 0..100 {
            let action = agent
                .select_action(&CanonicalState::empty(), &legal, true, &mut rng)
                .unwrap();
            assert!(legal.contains(&action));
        }
    }

    #[test]
    fn test_empty_legal_is_error() {
        let agent = QAgent::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            agent.select_action(&CanonicalState::empty(), &[], false, &mut rng),
            Err(Error::NoLegalActions)
        ));
    }

    #[test]
    fn test_repeated_update_converges_geometrically() {
        let alpha = 0.5;
        let reward = 1.0;
        let mut agent = QAgent::new(QAgentConfig {
            alpha,
            gamma: 0.0,
            ..QAgentConfig::default()
        });
        let s = CanonicalState::empty();
        let next = state([1, 0, 0, 0, 0, 0, 0, 0, 0]);

        agent.update(&s, 0, reward, &next, false);
        assert_eq!(agent.q_value(&s, 0), alpha * reward);

        agent.update(&s, 0, reward, &next, false);
        assert_eq!(agent.q_value(&s, 0), 0.75);

        for _ in 0..60 {
            agent.update(&s, 0, reward, &next, false);
        }
        assert!((agent.q_value(&s, 0) - reward).abs() < 1e-12);
    }

    #[test]
    fn test_update_bootstraps_from_empty_cells() {
        let mut agent = QAgent::new(QAgentConfig {
            alpha: 1.0,
            gamma: 0.5,
            ..QAgentConfig::default()
        });
        let s = CanonicalState::empty();
        let next = state([1, -1, 0, 0, 0, 0, 0, 0, 0]);
        // occupied cell 0 must not be considered
        agent.update(&next, 0, 10.0, &next, true);
        agent.update(&next, 4, 2.0, &next, true);

        agent.update(&s, 8, 0.0, &next, false);
        assert_eq!(agent.q_value(&s, 8), 1.0);
    }

    #[test]
    fn test_decay_follows_schedule() {
        let mut agent = QAgent::new(QAgentConfig {
            epsilon_start: 1.0,
            epsilon_min: 0.3,
            epsilon_decay: 0.5,
            ..QAgentConfig::default()
        });
        agent.decay_epsilon();
        assert_eq!(agent.epsilon(), 0.5);
        agent.decay_epsilon();
        agent.decay_epsilon();
        assert_eq!(agent.epsilon(), 0.3);
        assert_eq!(agent.episodes_decayed(), 3);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad = [
            QAgentConfig {
                alpha: 0.0,
                ..QAgentConfig::default()
            },
            QAgentConfig {
                alpha: 1.5,
                ..QAgentConfig::default()
            },
            QAgentConfig {
                gamma: -0.1,
                ..QAgentConfig::default()
            },
            QAgentConfig {
                epsilon_start: 1.1,
                ..QAgentConfig::default()
            },
            QAgentConfig {
                epsilon_start: 0.1,
                epsilon_min: 0.2,
                ..QAgentConfig::default()
            },
            QAgentConfig {
                epsilon_decay: 0.0,
                ..QAgentConfig::default()
            },
            QAgentConfig {
                alpha: f64::NAN,
                ..QAgentConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfiguration { .. })),
                "{config:?} should be rejected"
            );
        }
        assert!(QAgentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_policy_impl_uses_canonical_view() {
        let mut agent = QAgent::default();
        // O to move on a board with one X: canonical view has -1 at cell 0
        let board = Board::from_string("X........").unwrap();
        let seen_by_o = board.canonical(Player::O);
        agent.update(&seen_by_o, 4, 1.0, &seen_by_o, true);

        let mut rng = StdRng::seed_from_u64(0);
        let action =
            Policy::select_action(&agent, &board, Player::O, &board.legal_actions(), &mut rng)
                .unwrap();
        assert_eq!(action, 4);
    }
}
