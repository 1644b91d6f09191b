//! Read-only evaluation of a trained agent

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use super::{OutcomeTally, training::build_rng};
use crate::{
    Error, Result,
    config::StartingPlayer,
    ports::Policy,
    q_learning::QAgent,
    tictactoe::{Environment, GameOutcome, Player},
};

/// Mean and population standard deviation of one rate across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl RateSummary {
    fn from_rates(rates: &[f64]) -> Self {
        Self {
            mean: rates.iter().mean(),
            std_dev: rates.iter().population_std_dev(),
        }
    }
}

/// Aggregate of several seeded evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRunEvaluation {
    pub runs: Vec<OutcomeTally>,
    pub win_rate: RateSummary,
    pub draw_rate: RateSummary,
    pub loss_rate: RateSummary,
}

/// Plays a trained agent against an opponent with exploration off and no
/// learning. The agent is only borrowed immutably.
#[derive(Debug, Clone)]
pub struct Evaluator {
    trials: usize,
    starting_player: StartingPlayer,
    seed: Option<u64>,
    env: Environment,
}

impl Evaluator {
    pub fn new(trials: usize, starting_player: StartingPlayer) -> Self {
        Self {
            trials,
            starting_player,
            seed: None,
            env: Environment::new(),
        }
    }

    /// Seed for the opponent's randomness. A deterministic opponent against
    /// the greedy agent gives the same games whatever the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn starting_player(&self) -> StartingPlayer {
        self.starting_player
    }

    /// Play `trials` games and count them from the agent's side.
    pub fn evaluate<P: Policy + ?Sized>(
        &self,
        agent: &QAgent,
        opponent: &P,
    ) -> Result<OutcomeTally> {
        let mut rng = build_rng(self.seed);
        self.run(agent, opponent, &mut rng)
    }

    /// Repeat [`Evaluator::evaluate`] `runs` times with seeds `base..base + runs`,
    /// where `base` is this evaluator's seed (0 if unset).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `runs` is zero.
    pub fn evaluate_multirun<P: Policy + ?Sized>(
        &self,
        agent: &QAgent,
        opponent: &P,
        runs: usize,
    ) -> Result<MultiRunEvaluation> {
        if runs == 0 {
            return Err(Error::config("multi-run evaluation needs at least one run"));
        }

        let base = self.seed.unwrap_or(0);
        let mut tallies = Vec::with_capacity(runs);
        for run in 0..runs as u64 {
            let mut rng = build_rng(Some(base.wrapping_add(run)));
            let tally = self.run(agent, opponent, &mut rng)?;
            debug!(
                run,
                wins = tally.wins,
                draws = tally.draws,
                losses = tally.losses,
                "evaluation run"
            );
            tallies.push(tally);
        }

        let rates = |f: fn(&OutcomeTally) -> f64| tallies.iter().map(f).collect::<Vec<_>>();
        Ok(MultiRunEvaluation {
            win_rate: RateSummary::from_rates(&rates(OutcomeTally::win_rate)),
            draw_rate: RateSummary::from_rates(&rates(OutcomeTally::draw_rate)),
            loss_rate: RateSummary::from_rates(&rates(OutcomeTally::loss_rate)),
            runs: tallies,
        })
    }

    fn run<P: Policy + ?Sized>(
        &self,
        agent: &QAgent,
        opponent: &P,
        rng: &mut StdRng,
    ) -> Result<OutcomeTally> {
        let mut tally = OutcomeTally::default();
        for trial in 0..self.trials {
            let seat = self.starting_player.agent_seat(trial);
            let outcome = self.play_game(agent, opponent, seat, rng)?;
            tally.record(outcome.result_for(seat));
        }
        Ok(tally)
    }

    fn play_game<P: Policy + ?Sized>(
        &self,
        agent: &QAgent,
        opponent: &P,
        seat: Player,
        rng: &mut StdRng,
    ) -> Result<GameOutcome> {
        let mut board = self.env.reset();
        let mut player = Player::X;
        loop {
            let legal = board.legal_actions();
            let action = if player == seat {
                agent.select_action(&board.canonical(player), &legal, false, rng)?
            } else {
                opponent.select_action(&board, player, &legal, rng)?
            };

            let transition = self.env.step(&board, action, player)?;
            if let Some(outcome) = transition.outcome() {
                return Ok(outcome);
            }
            board = transition.board;
            player = player.opponent();
        }
    }
}
