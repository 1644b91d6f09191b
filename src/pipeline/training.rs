//! Curriculum training loop

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use super::{CancellationToken, EpisodeOpponent, TrainingMetrics};
use crate::{
    Result,
    config::TrainConfig,
    ports::{Observer, Policy},
    q_learning::QAgent,
    shaping::{TacticalSignals, shape},
    tictactoe::{Environment, GameOutcome, Player},
    types::CanonicalState,
};

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// What a training run hands back, completed or not.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub metrics: TrainingMetrics,
    pub agent: QAgent,
    /// Every configured episode ran.
    pub completed: bool,
    /// The run stopped early because its token was cancelled.
    pub cancelled: bool,
}

/// Trains one [`QAgent`] through a mix of self-play and fixed-opponent
/// episodes.
///
/// Each episode:
/// 1. draws the opponent (fixed with probability `opponent_mix`),
/// 2. plays to the end, updating the agent after every move it makes,
/// 3. gives the side that did not make the final move one last terminal
///    update, since only now is its last move's consequence known,
/// 4. records the result and decays epsilon.
///
/// All randomness (opponent draw, exploration, random opponents) comes from
/// one generator seeded from `config.seed`.
pub struct CurriculumTrainer {
    config: TrainConfig,
    env: Environment,
    observers: Vec<Box<dyn Observer>>,
    cancellation: CancellationToken,
}

impl CurriculumTrainer {
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if `config` fails
    /// validation; no episode has run at that point.
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            env: Environment::new(),
            observers: Vec::new(),
            cancellation: CancellationToken::new(),
        })
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// A handle that stops this trainer at the next episode boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Train a fresh agent built from `config.agent`.
    pub fn train(&mut self) -> Result<TrainingOutcome> {
        self.train_agent(QAgent::new(self.config.agent))
    }

    /// Continue training an existing agent.
    ///
    /// # Errors
    ///
    /// Fails only on observer errors or if a policy produces an illegal move,
    /// which indicates a bug rather than a game event.
    pub fn train_agent(&mut self, mut agent: QAgent) -> Result<TrainingOutcome> {
        let episodes = self.config.episodes;
        let mut rng = build_rng(self.config.seed);
        let mut metrics = TrainingMetrics::default();

        info!(
            episodes,
            opponent_mix = self.config.opponent_mix,
            curriculum_opponent = %self.config.curriculum_opponent,
            seed = ?self.config.seed,
            starting_states = agent.state_count(),
            "training started"
        );
        for observer in &mut self.observers {
            observer.on_training_start(episodes)?;
        }

        let mut cancelled = false;
        for episode in 0..episodes {
            if self.cancellation.is_cancelled() {
                cancelled = true;
                info!(episode, "training cancelled");
                break;
            }

            let opponent = EpisodeOpponent::pick(
                self.config.opponent_mix,
                self.config.curriculum_opponent,
                &mut rng,
            );
            let seat = self.config.starting_player.agent_seat(episode);
            let outcome = self.play_episode(&mut agent, opponent, seat, &mut rng)?;
            let result = outcome.result_for(seat);

            metrics.record(opponent, result);
            agent.decay_epsilon();

            for observer in &mut self.observers {
                observer.on_episode_end(episode, opponent, result)?;
            }

            if metrics
                .episodes_completed
                .is_multiple_of(self.config.snapshot_every)
            {
                let snapshot = metrics.snapshot(&agent);
                debug!(
                    episode = snapshot.episode,
                    wins = snapshot.wins,
                    draws = snapshot.draws,
                    losses = snapshot.losses,
                    epsilon = snapshot.epsilon,
                    states = snapshot.q_table_size,
                    "snapshot"
                );
                for observer in &mut self.observers {
                    observer.on_snapshot(&snapshot, &agent)?;
                }
                metrics.snapshots.push(snapshot);
            }
        }

        metrics.finish(&agent);
        for observer in &mut self.observers {
            observer.on_training_end(&metrics)?;
        }
        info!(
            completed = metrics.episodes_completed,
            wins = metrics.wins,
            draws = metrics.draws,
            losses = metrics.losses,
            states = metrics.q_table_size,
            final_epsilon = metrics.final_epsilon,
            "training finished"
        );

        Ok(TrainingOutcome {
            metrics,
            agent,
            completed: !cancelled,
            cancelled,
        })
    }

    /// Play one game, updating `agent` along the way.
    fn play_episode(
        &self,
        agent: &mut QAgent,
        opponent: EpisodeOpponent,
        seat: Player,
        rng: &mut StdRng,
    ) -> Result<GameOutcome> {
        let shaping = &self.config.reward_shaping;
        let tactics = shaping.has_tactics();

        let mut board = self.env.reset();
        let mut player = Player::X;
        // last (state, action) each learning seat played, indexed by Player::index
        let mut pending: [Option<(CanonicalState, usize)>; 2] = [None, None];

        loop {
            let legal = board.legal_actions();
            let state = board.canonical(player);

            let fixed = opponent.fixed().filter(|_| player != seat);
            let action = match fixed {
                Some(policy) => policy.select_action(&board, player, &legal, rng)?,
                None => agent.select_action(&state, &legal, true, rng)?,
            };

            let transition = self.env.step(&board, action, player)?;

            if fixed.is_none() {
                let signals =
                    tactics.then(|| TacticalSignals::observe(&board, &transition.board, player));
                let reward = shape(&transition, player, shaping, signals.as_ref());
                let next_state = transition.board.canonical(player);
                agent.update(&state, action, reward, &next_state, transition.done);
                pending[player.index()] = Some((state, action));
            }

            if transition.done {
                let other = player.opponent();
                if let Some((last_state, last_action)) = pending[other.index()] {
                    let reward = shape(&transition, other, shaping, None);
                    let final_state = transition.board.canonical(other);
                    agent.update(&last_state, last_action, reward, &final_state, true);
                }
                return Ok(GameOutcome::from_winner(transition.winner));
            }

            board = transition.board;
            player = player.opponent();
        }
    }
}

/// Validate `config`, train a fresh agent, and return the outcome.
pub fn train(config: TrainConfig) -> Result<TrainingOutcome> {
    CurriculumTrainer::new(config)?.train()
}
