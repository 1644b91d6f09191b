//! Exploration schedule

use serde::{Deserialize, Serialize};

/// Multiplicative epsilon decay with a floor.
///
/// `value_at(n) = max(min, start * decay^n)` where `n` is the number of
/// completed episodes. It is a pure function of `n`, so resuming a run at
/// episode `n` gives the same epsilon as never having stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonSchedule {
    pub start: f64,
    pub min: f64,
    pub decay: f64,
}

impl EpsilonSchedule {
    pub fn new(start: f64, min: f64, decay: f64) -> Self {
        Self { start, min, decay }
    }

    pub fn value_at(&self, episodes: u64) -> f64 {
        (self.start * self.decay.powf(episodes as f64)).max(self.min)
    }

    /// First episode count at which the floor is reached, if it ever is.
    pub fn episodes_to_floor(&self) -> Option<u64> {
        if self.start <= self.min {
            return Some(0);
        }
        if self.decay >= 1.0 || self.min <= 0.0 {
            return None;
        }
        let n = (self.min / self.start).ln() / self.decay.ln();
        Some(n.ceil() as u64)
    }
}
