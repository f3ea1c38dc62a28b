//! Environment port - the dynamics learners interact with
//!
//! Environments are functional: they never hold the episode state themselves.
//! The caller owns the current state and passes it in, and randomness is
//! injected through the `rng` argument. This keeps a single environment value
//! shareable across many concurrently simulated episodes.

use std::{fmt::Debug, hash::Hash};

use rand::rngs::StdRng;

use crate::Result;

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    /// State after the step, or `None` when the episode terminated.
    pub next_state: Option<S>,
    /// Reward for this step.
    pub reward: f64,
}

impl<S> Transition<S> {
    pub fn continuing(next_state: S, reward: f64) -> Self {
        Self {
            next_state: Some(next_state),
            reward,
        }
    }

    pub fn terminal(reward: f64) -> Self {
        Self {
            next_state: None,
            reward,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_state.is_none()
    }
}

/// Environment trait - episodic MDP with discrete states and actions
///
/// # Examples
///
/// ```
/// use racetrack_rl::ports::{Environment, Transition};
/// use rand::rngs::StdRng;
///
/// /// Walk right until reaching cell 3.
/// struct Corridor;
///
/// impl Environment for Corridor {
///     type State = u8;
///     type Action = ();
///
///     fn name(&self) -> &str {
///         "corridor"
///     }
///
///     fn initial_state(&self, _rng: &mut StdRng) -> racetrack_rl::Result<u8> {
///         Ok(0)
///     }
///
///     fn legal_actions(&self, _state: &u8) -> Vec<()> {
///         vec![()]
///     }
///
///     fn step(&self, state: &u8, _action: (), _rng: &mut StdRng) -> racetrack_rl::Result<Transition<u8>> {
///         Ok(if *state + 1 >= 3 {
///             Transition::terminal(-1.0)
///         } else {
///             Transition::continuing(state + 1, -1.0)
///         })
///     }
/// }
/// ```
pub trait Environment {
    type State: Clone + Eq + Hash + Debug + Send;
    type Action: Copy + Eq + Hash + Debug + Send;

    /// Short identifier used in logs and saved metadata.
    fn name(&self) -> &str;

    /// Sample the first state of an episode.
    fn initial_state(&self, rng: &mut StdRng) -> Result<Self::State>;

    /// Actions allowed in `state`, in a stable order.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply `action` in `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if `action` is not legal in `state`.
    fn step(
        &self,
        state: &Self::State,
        action: Self::Action,
        rng: &mut StdRng,
    ) -> Result<Transition<Self::State>>;

    /// Text picture of `state`, for environments that can draw themselves.
    fn render(&self, _state: &Self::State) -> Option<String> {
        None
    }
}
