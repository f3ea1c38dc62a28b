//! Learner port - abstraction for tabular control algorithms
//!
//! This port defines the interface that every agent trained by the pipeline
//! implements, allowing the same episode loop to drive:
//! - Off-policy Monte Carlo control (race track)
//! - SARSA (windy gridworld)
//! - Q-learning (grid world)

use crate::{Result, ports::Environment};

/// One experienced transition, as seen by a learner.
///
/// `next_action` is the action already chosen for `next_state` by the
/// behaviour policy, which on-policy methods such as SARSA bootstrap from.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S, A> {
    pub state: S,
    pub action: A,
    pub reward: f64,
    /// `None` once the episode has terminated.
    pub next_state: Option<S>,
    pub next_action: Option<A>,
}

impl<S, A> Step<S, A> {
    pub fn is_terminal(&self) -> bool {
        self.next_state.is_none()
    }
}

/// Learner trait - Unified interface for tabular agents
///
/// # Design Philosophy
///
/// This trait represents a **port** in hexagonal architecture. The training
/// pipeline owns the episode loop and the environment; learners only choose
/// actions and update their tables from the experience they are handed.
///
/// Learners that update online (TD methods) override [`Learner::learn_step`];
/// learners that need the whole episode (Monte Carlo) override
/// [`Learner::learn_episode`].
///
/// # Examples
///
/// ```no_run
/// use racetrack_rl::{
///     ports::{Environment, Learner},
///     pipeline::{TrainingConfig, TrainingPipeline},
/// };
///
/// fn train<E: Environment>(env: &E, learner: &mut dyn Learner<E>) -> racetrack_rl::Result<usize> {
///     let mut pipeline = TrainingPipeline::new(TrainingConfig::default());
///     let result = pipeline.run(env, learner)?;
///     Ok(result.episodes)
/// }
/// ```
pub trait Learner<E: Environment>: Send {
    /// Choose an action with the behaviour (exploring) policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` has no legal actions.
    fn select_action(&mut self, env: &E, state: &E::State) -> Result<E::Action>;

    /// Choose an action with the learned target policy, without exploring.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` has no legal actions.
    fn greedy_action(&self, env: &E, state: &E::State) -> Result<E::Action>;

    /// Update after every transition.
    ///
    /// # Default Implementation
    ///
    /// Does nothing, suitable for learners that only learn from whole
    /// episodes.
    fn learn_step(&mut self, _env: &E, _step: &Step<E::State, E::Action>) -> Result<()> {
        Ok(())
    }

    /// Update after an episode ends, terminated or truncated.
    ///
    /// The last step of a terminated episode has no `next_state`; a
    /// truncated episode ends on a step that still has one, see
    /// [`Step::is_terminal`].
    ///
    /// # Default Implementation
    ///
    /// Does nothing, suitable for online learners.
    fn learn_episode(&mut self, _env: &E, _episode: &[Step<E::State, E::Action>]) -> Result<()> {
        Ok(())
    }

    /// Used for identification in summaries and logging.
    fn name(&self) -> &str;

    /// Forget everything learned so far.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Seed the learner's internal random number generator.
    ///
    /// Training pipelines call this method when supplied with a deterministic
    /// seed to ensure reproducible results.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }

    /// Number of stored state-action values.
    fn table_size(&self) -> usize {
        0
    }
}
