//! SARSA and Q-learning agents
//!
//! Both agents act ε-greedily on a [`QTable`] with a constant exploration
//! rate. Ties between equally valued actions are broken uniformly at random
//! when acting, and by legal-action order when asked for the greedy policy.

use std::{fmt::Debug, hash::Hash};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    ports::{Environment, Learner, Step},
    td_learning::q_table::QTable,
};

/// Hyperparameters shared by the TD agents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdConfig {
    /// α, in (0, 1]
    pub learning_rate: f64,
    /// γ, in [0, 1]
    pub discount_factor: f64,
    /// Probability of a uniformly random action, in [0, 1]
    pub epsilon: f64,
    pub q_init: f64,
}

impl TdConfig {
    /// SARSA settings for the windy gridworld.
    pub fn windy() -> Self {
        Self {
            learning_rate: 0.5,
            discount_factor: 1.0,
            epsilon: 0.1,
            q_init: -50.0,
        }
    }

    /// Q-learning settings for the target-seeking grid world.
    pub fn gridworld() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 1.0,
            epsilon: 0.1,
            q_init: 0.0,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a rate is out of range.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("learning rate", self.learning_rate, self.learning_rate > 0.0 && self.learning_rate <= 1.0),
            ("discount factor", self.discount_factor, (0.0..=1.0).contains(&self.discount_factor)),
            ("epsilon", self.epsilon, (0.0..=1.0).contains(&self.epsilon)),
        ];
        for (name, value, ok) in checks {
            if !ok {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} {value} is out of range"),
                });
            }
        }
        Ok(())
    }
}

impl Default for TdConfig {
    fn default() -> Self {
        Self::gridworld()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, A: Serialize",
    deserialize = "S: Deserialize<'de> + Eq + Hash, A: Deserialize<'de> + Eq + Hash"
))]
pub(crate) struct TdAgentState<S, A> {
    pub q_table: QTable<S, A>,
    pub epsilon: f64,
    pub rng_seed: Option<u64>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

fn no_legal_actions(state: &impl Debug) -> Error {
    Error::NoLegalActions {
        state: format!("{state:?}"),
    }
}

/// Q-table with an ε-greedy behaviour policy
#[derive(Debug, Clone)]
struct EpsilonGreedy<S, A> {
    q_table: QTable<S, A>,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl<S, A> EpsilonGreedy<S, A>
where
    S: Clone + Eq + Hash,
    A: Copy + Eq + Hash,
{
    fn new(config: TdConfig) -> Self {
        Self {
            q_table: QTable::new(config.learning_rate, config.discount_factor, config.q_init),
            epsilon: config.epsilon,
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    fn select(&mut self, state: &S, legal_actions: &[A]) -> Option<A> {
        if self.rng.random::<f64>() < self.epsilon {
            legal_actions.choose(&mut self.rng).copied()
        } else {
            self.q_table
                .greedy_actions(state, legal_actions)
                .choose(&mut self.rng)
                .copied()
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    fn reset(&mut self) {
        self.q_table.reset();
        self.rng = build_rng(self.rng_seed);
    }

    fn export_state(&self) -> TdAgentState<S, A> {
        TdAgentState {
            q_table: self.q_table.clone(),
            epsilon: self.epsilon,
            rng_seed: self.rng_seed,
        }
    }

    fn from_state(state: TdAgentState<S, A>) -> Self {
        Self {
            q_table: state.q_table,
            epsilon: state.epsilon,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        }
    }
}

/// SARSA agent (on-policy TD control)
///
/// Learns Q^π for the ε-greedy policy it follows, bootstrapping from the
/// action actually chosen in the next state.
#[derive(Debug, Clone)]
pub struct SarsaAgent<S, A> {
    policy: EpsilonGreedy<S, A>,
}

impl<S, A> SarsaAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Copy + Eq + Hash,
{
    pub fn new(config: TdConfig) -> Self {
        Self {
            policy: EpsilonGreedy::new(config),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.policy.reseed(seed);
        self
    }

    /// See [`QTable::with_state_value`].
    pub fn with_state_value(mut self, state: S, value: f64) -> Self {
        self.policy.q_table = self.policy.q_table.with_state_value(state, value);
        self
    }

    pub fn q_table(&self) -> &QTable<S, A> {
        &self.policy.q_table
    }

    pub(crate) fn export_state(&self) -> TdAgentState<S, A> {
        self.policy.export_state()
    }

    pub(crate) fn from_state(state: TdAgentState<S, A>) -> Self {
        Self {
            policy: EpsilonGreedy::from_state(state),
        }
    }
}

impl<E> Learner<E> for SarsaAgent<E::State, E::Action>
where
    E: Environment,
{
    fn select_action(&mut self, env: &E, state: &E::State) -> Result<E::Action> {
        let legal_actions = env.legal_actions(state);
        self.policy
            .select(state, &legal_actions)
            .ok_or_else(|| no_legal_actions(state))
    }

    fn greedy_action(&self, env: &E, state: &E::State) -> Result<E::Action> {
        self.policy
            .q_table
            .greedy_action(state, &env.legal_actions(state))
            .ok_or_else(|| no_legal_actions(state))
    }

    fn learn_step(&mut self, _env: &E, step: &Step<E::State, E::Action>) -> Result<()> {
        let next = step.next_state.as_ref().zip(step.next_action);
        self.policy
            .q_table
            .sarsa_update(step.state.clone(), step.action, step.reward, next);
        Ok(())
    }

    fn name(&self) -> &str {
        "SARSA"
    }

    fn reset(&mut self) -> Result<()> {
        self.policy.reset();
        Ok(())
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.policy.reseed(seed);
        Ok(())
    }

    fn table_size(&self) -> usize {
        self.policy.q_table.size()
    }
}

/// Q-learning agent (off-policy TD control)
///
/// Learns the optimal Q* function by always updating toward the maximum
/// next-state value, regardless of the action taken next.
#[derive(Debug, Clone)]
pub struct QLearningAgent<S, A> {
    policy: EpsilonGreedy<S, A>,
}

impl<S, A> QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Copy + Eq + Hash,
{
    pub fn new(config: TdConfig) -> Self {
        Self {
            policy: EpsilonGreedy::new(config),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.policy.reseed(seed);
        self
    }

    /// See [`QTable::with_state_value`].
    pub fn with_state_value(mut self, state: S, value: f64) -> Self {
        self.policy.q_table = self.policy.q_table.with_state_value(state, value);
        self
    }

    pub fn q_table(&self) -> &QTable<S, A> {
        &self.policy.q_table
    }

    pub(crate) fn export_state(&self) -> TdAgentState<S, A> {
        self.policy.export_state()
    }

    pub(crate) fn from_state(state: TdAgentState<S, A>) -> Self {
        Self {
            policy: EpsilonGreedy::from_state(state),
        }
    }
}

impl<E> Learner<E> for QLearningAgent<E::State, E::Action>
where
    E: Environment,
{
    fn select_action(&mut self, env: &E, state: &E::State) -> Result<E::Action> {
        let legal_actions = env.legal_actions(state);
        self.policy
            .select(state, &legal_actions)
            .ok_or_else(|| no_legal_actions(state))
    }

    fn greedy_action(&self, env: &E, state: &E::State) -> Result<E::Action> {
        self.policy
            .q_table
            .greedy_action(state, &env.legal_actions(state))
            .ok_or_else(|| no_legal_actions(state))
    }

    fn learn_step(&mut self, env: &E, step: &Step<E::State, E::Action>) -> Result<()> {
        let next_legal = step
            .next_state
            .as_ref()
            .map(|next_state| env.legal_actions(next_state));
        let next = step
            .next_state
            .as_ref()
            .zip(next_legal.as_deref());
        self.policy
            .q_table
            .q_learning_update(step.state.clone(), step.action, step.reward, next);
        Ok(())
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn reset(&mut self) -> Result<()> {
        self.policy.reset();
        Ok(())
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.policy.reseed(seed);
        Ok(())
    }

    fn table_size(&self) -> usize {
        self.policy.q_table.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grid::Coordinate,
        gridworld::GridWorld,
        windy::{Move, WindyGridworld},
    };

    #[test]
    fn test_config_validation() {
        assert!(TdConfig::windy().validate().is_ok());
        let bad = TdConfig {
            epsilon: 1.5,
            ..TdConfig::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_greedy_selection_breaks_ties_randomly() {
        let env = WindyGridworld::default();
        let config = TdConfig {
            epsilon: 0.0,
            ..TdConfig::windy()
        };
        let mut agent: SarsaAgent<Coordinate, Move> = SarsaAgent::new(config).with_seed(3);
        let start = env.start();

        let chosen: std::collections::HashSet<Move> = (0..100)
            .map(|_| agent.select_action(&env, &start).unwrap())
            .collect();
        assert_eq!(chosen.len(), 4);
        // The greedy policy itself is deterministic.
        assert_eq!(agent.greedy_action(&env, &start).unwrap(), Move::LEFT);
    }

    #[test]
    fn test_sarsa_bootstraps_from_next_action() {
        let env = WindyGridworld::default();
        let mut agent: SarsaAgent<Coordinate, Move> = SarsaAgent::new(TdConfig::windy());
        let s = Coordinate::new(1, 4);
        let s2 = Coordinate::new(2, 4);
        let step = Step {
            state: s,
            action: Move::RIGHT,
            reward: -1.0,
            next_state: Some(s2),
            next_action: Some(Move::UP),
        };
        agent.learn_step(&env, &step).unwrap();
        // -50 + 0.5 * (-1 + -50 - -50) = -50.5
        assert_eq!(agent.q_table().get(&s, Move::RIGHT), -50.5);
        assert_eq!(Learner::<WindyGridworld>::table_size(&agent), 1);
    }

    #[test]
    fn test_q_learning_uses_best_next_value() {
        let env = GridWorld::default();
        let mut agent: QLearningAgent<usize, usize> = QLearningAgent::new(TdConfig::gridworld());
        let step = Step {
            state: 10,
            action: 1,
            reward: -1.0,
            next_state: Some(11),
            next_action: None,
        };
        agent.learn_step(&env, &step).unwrap();
        // 0 + 0.1 * (-1 + 0 - 0) = -0.1
        assert!((agent.q_table().get(&10, 1) + 0.1).abs() < 1e-12);
        assert_eq!(agent.greedy_action(&env, &10).unwrap(), 0);

        Learner::<GridWorld>::reset(&mut agent).unwrap();
        assert_eq!(agent.q_table().size(), 0);
    }
}
