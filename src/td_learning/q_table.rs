//! Q-table implementation for temporal difference learning

use std::{collections::HashMap, hash::Hash};

use serde::{Deserialize, Serialize};

/// Q-table mapping (state, action) pairs to Q-values
///
/// Entries are created lazily; unseen pairs read as the state's initial value,
/// which is `q_init` unless overridden with [`QTable::with_state_value`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, A: Serialize",
    deserialize = "S: Deserialize<'de> + Eq + Hash, A: Deserialize<'de> + Eq + Hash"
))]
pub struct QTable<S, A> {
    /// Q-values: (state, action) -> Q-value
    q_values: HashMap<(S, A), f64>,
    /// Initial Q-values for specific states
    state_values: HashMap<S, f64>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
    /// Initial Q-value for unseen state-action pairs
    q_init: f64,
}

impl<S, A> QTable<S, A>
where
    S: Clone + Eq + Hash,
    A: Copy + Eq + Hash,
{
    pub fn new(learning_rate: f64, discount_factor: f64, q_init: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            state_values: HashMap::new(),
            learning_rate,
            discount_factor,
            q_init,
        }
    }

    /// Start every action of `state` at `value` instead of `q_init`.
    pub fn with_state_value(mut self, state: S, value: f64) -> Self {
        self.state_values.insert(state, value);
        self
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub fn q_init(&self) -> f64 {
        self.q_init
    }

    pub fn get(&self, state: &S, action: A) -> f64 {
        self.q_values
            .get(&(state.clone(), action))
            .or_else(|| self.state_values.get(state))
            .copied()
            .unwrap_or(self.q_init)
    }

    pub fn set(&mut self, state: S, action: A, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Maximum Q-value over legal actions, `-inf` if there are none
    pub fn max_q(&self, state: &S, legal_actions: &[A]) -> f64 {
        legal_actions
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// All legal actions sharing the highest Q-value, in the order given
    pub fn greedy_actions(&self, state: &S, legal_actions: &[A]) -> Vec<A> {
        let best = self.max_q(state, legal_actions);
        legal_actions
            .iter()
            .copied()
            .filter(|&action| self.get(state, action) == best)
            .collect()
    }

    /// First legal action with the highest Q-value
    pub fn greedy_action(&self, state: &S, legal_actions: &[A]) -> Option<A> {
        self.greedy_actions(state, legal_actions).first().copied()
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// `next` is `None` for terminal transitions, which bootstrap from 0.
    pub fn q_learning_update(&mut self, state: S, action: A, reward: f64, next: Option<(&S, &[A])>) {
        let max_next_q = match next {
            Some((next_state, next_legal)) if !next_legal.is_empty() => {
                self.max_q(next_state, next_legal)
            }
            _ => 0.0,
        };
        self.apply_td(state, action, reward + self.discount_factor * max_next_q);
    }

    /// SARSA update: on-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') - Q(s,a)]
    pub fn sarsa_update(&mut self, state: S, action: A, reward: f64, next: Option<(&S, A)>) {
        let next_q = next.map_or(0.0, |(next_state, next_action)| {
            self.get(next_state, next_action)
        });
        self.apply_td(state, action, reward + self.discount_factor * next_q);
    }

    /// Forget all learned values; state overrides are kept
    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Number of stored Q-values
    pub fn size(&self) -> usize {
        self.q_values.len()
    }

    fn apply_td(&mut self, state: S, action: A, td_target: f64) {
        let current_q = self.get(&state, action);
        let new_q = current_q + self.learning_rate * (td_target - current_q);
        self.set(state, action, new_q);
    }
}
