//! Off-policy every-visit Monte Carlo control with weighted importance sampling

use std::collections::HashMap;

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::{Error, Result},
    ports::{Learner, Step},
    racetrack::{Acceleration, CarState, RaceTrack},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Value of every state-action pair before it is first updated
    pub q_init: f64,
    /// γ, in [0, 1]
    pub discount_factor: f64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            q_init: -1000.0,
            discount_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MonteCarloState {
    pub config: MonteCarloConfig,
    pub q: Vec<((CarState, Acceleration), f64)>,
    pub c: Vec<((CarState, Acceleration), f64)>,
    pub policy: Vec<(CarState, Acceleration)>,
    pub rng_seed: Option<u64>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Monte Carlo control agent for the race track
///
/// Explores with a uniformly random behaviour policy and learns a
/// deterministic greedy target policy from the returns it observes. Episodes
/// are replayed backwards; the importance weight grows by the number of legal
/// actions at each step and the replay stops at the first action the target
/// policy would not have taken.
#[derive(Debug, Clone)]
pub struct MonteCarloAgent {
    config: MonteCarloConfig,
    q: HashMap<(CarState, Acceleration), f64>,
    c: HashMap<(CarState, Acceleration), f64>,
    policy: HashMap<CarState, Acceleration>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl MonteCarloAgent {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self {
            config,
            q: HashMap::new(),
            c: HashMap::new(),
            policy: HashMap::new(),
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn config(&self) -> MonteCarloConfig {
        self.config
    }

    pub fn q_value(&self, state: &CarState, action: Acceleration) -> f64 {
        self.q
            .get(&(*state, action))
            .copied()
            .unwrap_or(self.config.q_init)
    }

    /// Cumulative importance weight of a state-action pair
    pub fn weight_sum(&self, state: &CarState, action: Acceleration) -> f64 {
        self.c.get(&(*state, action)).copied().unwrap_or(0.0)
    }

    /// Target policy action in `state`; the first legal action until learned.
    pub fn policy_action(&self, track: &RaceTrack, state: &CarState) -> Option<Acceleration> {
        self.policy
            .get(state)
            .copied()
            .or_else(|| track.legal_actions(state.velocity).first().copied())
    }

    /// Number of states with a learned policy entry
    pub fn policy_size(&self) -> usize {
        self.policy.len()
    }

    /// First legal action with strictly the greatest value
    fn best_action(&self, state: &CarState, legal_actions: &[Acceleration]) -> Option<Acceleration> {
        let mut best: Option<(Acceleration, f64)> = None;
        for &action in legal_actions {
            let value = self.q_value(state, action);
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((action, value));
            }
        }
        best.map(|(action, _)| action)
    }

    pub(crate) fn export_state(&self) -> MonteCarloState {
        MonteCarloState {
            config: self.config,
            q: self.q.iter().map(|(key, value)| (*key, *value)).collect(),
            c: self.c.iter().map(|(key, value)| (*key, *value)).collect(),
            policy: self.policy.iter().map(|(key, value)| (*key, *value)).collect(),
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: MonteCarloState) -> Self {
        Self {
            config: state.config,
            q: state.q.into_iter().collect(),
            c: state.c.into_iter().collect(),
            policy: state.policy.into_iter().collect(),
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        }
    }
}

impl Default for MonteCarloAgent {
    fn default() -> Self {
        Self::new(MonteCarloConfig::default())
    }
}

impl Learner<RaceTrack> for MonteCarloAgent {
    fn select_action(&mut self, env: &RaceTrack, state: &CarState) -> Result<Acceleration> {
        env.legal_actions(state.velocity)
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| Error::NoLegalActions {
                state: state.to_string(),
            })
    }

    fn greedy_action(&self, env: &RaceTrack, state: &CarState) -> Result<Acceleration> {
        self.policy_action(env, state)
            .ok_or_else(|| Error::NoLegalActions {
                state: state.to_string(),
            })
    }

    fn learn_episode(
        &mut self,
        env: &RaceTrack,
        episode: &[Step<CarState, Acceleration>],
    ) -> Result<()> {
        // Only finished episodes carry a true return.
        if !episode.last().is_some_and(Step::is_terminal) {
            trace!(steps = episode.len(), "skipping truncated episode");
            return Ok(());
        }

        let mut g = 0.0;
        let mut w = 1.0;
        let mut updated = 0;

        for step in episode.iter().rev() {
            g = self.config.discount_factor * g + step.reward;
            let key = (step.state, step.action);

            let c = self.c.entry(key).or_insert(0.0);
            *c += w;
            let c = *c;
            let q = self.q.entry(key).or_insert(self.config.q_init);
            *q += (w / c) * (g - *q);
            updated += 1;

            let legal_actions = env.legal_actions(step.state.velocity);
            if let Some(best) = self.best_action(&step.state, &legal_actions) {
                self.policy.insert(step.state, best);
            }
            if self.policy.get(&step.state) != Some(&step.action) {
                break;
            }
            w *= legal_actions.len() as f64;
        }

        trace!(
            steps = episode.len(),
            updated,
            "monte carlo backward pass"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "Off-policy MC"
    }

    fn reset(&mut self) -> Result<()> {
        self.q.clear();
        self.c.clear();
        self.policy.clear();
        self.rng = build_rng(self.rng_seed);
        Ok(())
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        Ok(())
    }

    fn table_size(&self) -> usize {
        self.q.len()
    }
}
