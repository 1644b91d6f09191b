//! Reward shaping
//!
//! The environment only pays out on a win. Training uses a denser signal:
//! terminal rewards for win, draw and loss, a small per-move penalty, and
//! optional bonuses for blocking or creating an immediate winning threat.
//!
//! Shaping is meant to keep `|terminal| > |tactical| > |step_penalty|`.
//! This ordering is assumed, not checked.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    tictactoe::{Board, Player, Transition},
};

/// Shaped reward values, all from the acting player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    pub win_reward: f64,
    pub draw_reward: f64,
    pub loss_reward: f64,
    pub step_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_threat_reward: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_threat_reward: Option<f64>,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            win_reward: 2.0,
            draw_reward: -0.2,
            loss_reward: -2.0,
            step_penalty: -0.01,
            block_threat_reward: None,
            create_threat_reward: None,
        }
    }
}

impl RewardShaping {
    /// Stronger terminal rewards plus both tactical bonuses.
    pub fn tactical() -> Self {
        Self {
            win_reward: 3.0,
            draw_reward: -0.2,
            loss_reward: -3.0,
            step_penalty: -0.01,
            block_threat_reward: Some(0.10),
            create_threat_reward: Some(0.05),
        }
    }

    /// Whether any tactical bonus is configured.
    pub fn has_tactics(&self) -> bool {
        self.block_threat_reward.is_some() || self.create_threat_reward.is_some()
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if any value is not finite.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("win_reward", Some(self.win_reward)),
            ("draw_reward", Some(self.draw_reward)),
            ("loss_reward", Some(self.loss_reward)),
            ("step_penalty", Some(self.step_penalty)),
            ("block_threat_reward", self.block_threat_reward),
            ("create_threat_reward", self.create_threat_reward),
        ];
        for (name, value) in fields {
            if let Some(value) = value
                && !value.is_finite()
            {
                return Err(Error::config(format!(
                    "reward_shaping.{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// What a single move did to the immediate-win threats on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TacticalSignals {
    /// The opponent had fewer winning cells after the move than before.
    pub blocked_threat: bool,
    /// The mover gained a winning cell it did not have before.
    pub created_threat: bool,
}

impl TacticalSignals {
    pub fn observe(before: &Board, after: &Board, acting: Player) -> Self {
        let opponent = acting.opponent();
        let opponent_before = before.winning_moves(opponent);
        let opponent_after = after.winning_moves(opponent);

        let own_before = before.winning_moves(acting);
        let own_after = after.winning_moves(acting);

        Self {
            blocked_threat: opponent_after.len() < opponent_before.len(),
            created_threat: own_after.difference(&own_before).next().is_some(),
        }
    }
}

/// Shaped reward for `acting` after `transition`.
///
/// Terminal transitions pay the terminal reward only; tactical bonuses are
/// suppressed even if the winning move also blocked or created a threat.
/// Non-terminal transitions pay `step_penalty` plus any configured bonus
/// whose signal fired. The raw environment reward is not used.
pub fn shape(
    transition: &Transition,
    acting: Player,
    config: &RewardShaping,
    signals: Option<&TacticalSignals>,
) -> f64 {
    if transition.done {
        return match transition.winner {
            Some(winner) if winner == acting => config.win_reward,
            Some(_) => config.loss_reward,
            None => config.draw_reward,
        };
    }

    let mut reward = config.step_penalty;
    if let Some(signals) = signals {
        if signals.blocked_threat {
            reward += config.block_threat_reward.unwrap_or(0.0);
        }
        if signals.created_threat {
            reward += config.create_threat_reward.unwrap_or(0.0);
        }
    }
    reward
}
