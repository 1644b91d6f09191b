//! Per-episode opponent selection

use std::fmt;

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::policies::Opponent;

/// Who the learner faces in one training episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOpponent {
    /// The learner plays both seats with its own table.
    SelfPlay,
    /// A fixed policy takes the other seat and never learns.
    Fixed(Opponent),
}

impl EpisodeOpponent {
    /// Draw one uniform value; below `mix` selects the fixed opponent.
    ///
    /// The draw happens on every call, whatever `mix` is, so the random
    /// stream does not depend on the mix ratio.
    pub fn pick(mix: f64, fixed: Opponent, rng: &mut StdRng) -> Self {
        if rng.random::<f64>() < mix {
            EpisodeOpponent::Fixed(fixed)
        } else {
            EpisodeOpponent::SelfPlay
        }
    }

    pub fn is_self_play(self) -> bool {
        matches!(self, EpisodeOpponent::SelfPlay)
    }

    /// The fixed policy, if any
    pub fn fixed(self) -> Option<Opponent> {
        match self {
            EpisodeOpponent::SelfPlay => None,
            EpisodeOpponent::Fixed(opponent) => Some(opponent),
        }
    }
}

impl fmt::Display for EpisodeOpponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeOpponent::SelfPlay => write!(f, "self-play"),
            EpisodeOpponent::Fixed(opponent) => write!(f, "{opponent}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_extreme_mix_values() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            assert_eq!(
                EpisodeOpponent::pick(1.0, Opponent::Heuristic, &mut rng),
                EpisodeOpponent::Fixed(Opponent::Heuristic)
            );
            assert_eq!(
                EpisodeOpponent::pick(0.0, Opponent::Heuristic, &mut rng),
                EpisodeOpponent::SelfPlay
            );
        }
    }

    #[test]
    fn test_mix_ratio_is_respected_roughly() {
        let mut rng = StdRng::seed_from_u64(2);
        let fixed = (0..10_000)
            .filter(|_| !EpisodeOpponent::pick(0.3, Opponent::Random, &mut rng).is_self_play())
            .count();
        assert!((2_700..3_300).contains(&fixed), "got {fixed}");
    }
}
