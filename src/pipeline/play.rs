//! Games between a person and a trained agent
//!
//! The agent always plays greedily. With online learning enabled it also
//! updates its table after each of its own moves, and once more when the
//! person ends the game, exactly as during curriculum training.

use rand::rngs::StdRng;

use crate::{
    Result,
    ports::Policy,
    q_learning::QAgent,
    shaping::{RewardShaping, TacticalSignals, shape},
    tictactoe::{Board, Environment, GameOutcome, Player},
    types::CanonicalState,
};

/// Result of one finished [`HumanMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport {
    pub outcome: GameOutcome,
    pub human_seat: Player,
    /// Q-value updates applied to the agent during the game
    pub updates: usize,
}

impl MatchReport {
    pub fn human_started(&self) -> bool {
        self.human_seat == Player::X
    }
}

/// One game between a person, seen through any [`Policy`], and an agent.
pub struct HumanMatch<'a> {
    agent: &'a mut QAgent,
    human_seat: Player,
    learning: Option<RewardShaping>,
    env: Environment,
}

impl<'a> HumanMatch<'a> {
    pub fn new(agent: &'a mut QAgent, human_seat: Player) -> Self {
        Self {
            agent,
            human_seat,
            learning: None,
            env: Environment::new(),
        }
    }

    /// Update the agent from this game using `shaping`.
    pub fn with_online_learning(mut self, shaping: RewardShaping) -> Self {
        self.learning = Some(shaping);
        self
    }

    pub fn agent_seat(&self) -> Player {
        self.human_seat.opponent()
    }

    /// Play to the end. `on_move` is called after every applied move.
    ///
    /// # Errors
    ///
    /// Propagates errors from the human policy, including
    /// [`crate::Error::MatchAbandoned`]; updates made before that point stay
    /// in the agent.
    pub fn play<P, F>(
        mut self,
        human: &P,
        rng: &mut StdRng,
        mut on_move: F,
    ) -> Result<MatchReport>
    where
        P: Policy + ?Sized,
        F: FnMut(Player, usize, &Board) -> Result<()>,
    {
        let agent_seat = self.agent_seat();
        let mut board = self.env.reset();
        let mut player = Player::X;
        let mut last_agent_move: Option<(CanonicalState, usize)> = None;
        let mut updates = 0;

        loop {
            let legal = board.legal_actions();
            let (action, agent_state) = if player == self.human_seat {
                (human.select_action(&board, player, &legal, rng)?, None)
            } else {
                let state = board.canonical(player);
                let action = self.agent.select_action(&state, &legal, false, rng)?;
                (action, Some(state))
            };

            let transition = self.env.step(&board, action, player)?;
            on_move(player, action, &transition.board)?;

            if let Some(shaping) = &self.learning {
                match agent_state {
                    Some(state) => {
                        let signals = shaping.has_tactics().then(|| {
                            TacticalSignals::observe(&board, &transition.board, player)
                        });
                        let reward = shape(&transition, player, shaping, signals.as_ref());
                        let next_state = transition.board.canonical(player);
                        self.agent
                            .update(&state, action, reward, &next_state, transition.done);
                        last_agent_move = Some((state, action));
                        updates += 1;
                    }
                    None if transition.done => {
                        if let Some((state, action)) = last_agent_move.take() {
                            let reward = shape(&transition, agent_seat, shaping, None);
                            let final_state = transition.board.canonical(agent_seat);
                            self.agent.update(&state, action, reward, &final_state, true);
                            updates += 1;
                        }
                    }
                    None => {}
                }
            }

            if transition.done {
                return Ok(MatchReport {
                    outcome: GameOutcome::from_winner(transition.winner),
                    human_seat: self.human_seat,
                    updates,
                });
            }
            board = transition.board;
            player = player.opponent();
        }
    }
}
