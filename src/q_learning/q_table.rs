//! Q-table implementation for temporal difference learning

use std::collections::{BTreeMap, HashMap};

use crate::types::CanonicalState;

/// Q-table mapping canonical states to per-action value estimates
///
/// Entries are created lazily by [`QTable::set`]; unseen pairs read as `0.0`.
/// Nothing is ever removed while training.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    /// canonical_state -> action -> Q-value
    q_values: HashMap<CanonicalState, BTreeMap<usize, f64>>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &CanonicalState, action: usize) -> f64 {
        self.q_values
            .get(state)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Stored values for one state, if it has been visited.
    pub fn actions(&self, state: &CanonicalState) -> Option<&BTreeMap<usize, f64>> {
        self.q_values.get(state)
    }

    pub fn set(&mut self, state: CanonicalState, action: usize, value: f64) {
        self.q_values.entry(state).or_default().insert(action, value);
    }

    /// Maximum Q-value over `legal_actions`, or `0.0` when there are none.
    pub fn max_q(&self, state: &CanonicalState, legal_actions: &[usize]) -> f64 {
        legal_actions
            .iter()
            .map(|&action| self.get(state, action))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Highest-valued legal action; ties go to the lowest action index.
    pub fn greedy_action(&self, state: &CanonicalState, legal_actions: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &action in legal_actions {
            let value = self.get(state, action);
            best = match best {
                Some((best_action, best_value))
                    if best_value > value || (best_value == value && best_action < action) =>
                {
                    Some((best_action, best_value))
                }
                _ => Some((action, value)),
            };
        }
        best.map(|(action, _)| action)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// On a terminal transition the bootstrap term is dropped entirely and
    /// `next_state` is not consulted.
    pub fn q_learning_update(
        &mut self,
        state: CanonicalState,
        action: usize,
        reward: f64,
        next_state: &CanonicalState,
        next_legal_actions: &[usize],
        done: bool,
    ) {
        let current_q = self.get(&state, action);
        let td_target = if done {
            reward
        } else {
            reward + self.discount_factor * self.max_q(next_state, next_legal_actions)
        };
        let new_q = current_q + self.learning_rate * (td_target - current_q);
        self.set(state, action, new_q);
    }

    /// Iterate over every visited state and its action values.
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalState, &BTreeMap<usize, f64>)> {
        self.q_values.iter()
    }

    /// Drop every stored value, keeping the hyperparameters.
    pub fn clear(&mut self) {
        self.q_values.clear();
    }

    /// Number of visited states
    pub fn state_count(&self) -> usize {
        self.q_values.len()
    }

    /// Number of stored (state, action) values
    pub fn size(&self) -> usize {
        self.q_values.values().map(BTreeMap::len).sum()
    }
}
