//! Training pipeline for tabular learners

use std::{fs::File, io::BufWriter, path::Path};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Result,
    error::Error,
    ports::{EpisodeSummary, Environment, Learner, Observer, Step},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Maximum number of training episodes
    pub num_episodes: usize,

    /// Stop starting new episodes once more than this many steps were taken
    pub max_total_steps: Option<usize>,

    /// Truncate an episode after this many steps
    pub max_episode_steps: Option<usize>,

    /// Random seed for the environment; the learner is seeded with `seed + 1`
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_episode_steps == Some(0) {
            return Err(Error::InvalidConfiguration {
                message: "max episode steps must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            max_total_steps: None,
            max_episode_steps: None,
            seed: None,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes played
    pub episodes: usize,

    /// Environment steps across all episodes
    pub total_steps: usize,

    /// Episodes that reached a terminal state
    pub terminated: usize,

    /// Episodes cut off by the episode step limit
    pub truncated: usize,

    pub mean_episode_length: f64,

    pub mean_return: f64,
}

impl TrainingResult {
    pub fn new(
        episodes: usize,
        total_steps: usize,
        terminated: usize,
        truncated: usize,
        total_return: f64,
    ) -> Self {
        let (mean_episode_length, mean_return) = if episodes > 0 {
            (
                total_steps as f64 / episodes as f64,
                total_return / episodes as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            episodes,
            total_steps,
            terminated,
            truncated,
            mean_episode_length,
            mean_return,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Provenance stored alongside saved agents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Environment the agent was trained in
    pub environment: Option<String>,
    /// Number of episodes trained
    pub episodes_trained: Option<usize>,
    /// Number of environment steps trained
    pub total_steps: Option<usize>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
}

impl TrainingMetadata {
    pub fn from_result(environment: &str, result: &TrainingResult, seed: Option<u64>) -> Self {
        Self {
            environment: Some(environment.to_string()),
            episodes_trained: Some(result.episodes),
            total_steps: Some(result.total_steps),
            seed,
        }
    }
}

/// Greedy run of a learned policy
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout<S> {
    /// Visited states, starting with the initial state
    pub states: Vec<S>,
    pub total_return: f64,
    /// `false` if `max_steps` ran out first
    pub terminated: bool,
}

impl<S> Rollout<S> {
    pub fn steps(&self) -> usize {
        if self.terminated {
            self.states.len()
        } else {
            self.states.len().saturating_sub(1)
        }
    }
}

/// Follow the learner's greedy policy for at most `max_steps` steps.
pub fn rollout<E: Environment>(
    env: &E,
    learner: &dyn Learner<E>,
    max_steps: usize,
    rng: &mut StdRng,
) -> Result<Rollout<E::State>> {
    let mut state = env.initial_state(rng)?;
    let mut states = vec![state.clone()];
    let mut total_return = 0.0;

    for _ in 0..max_steps {
        let action = learner.greedy_action(env, &state)?;
        let transition = env.step(&state, action, rng)?;
        total_return += transition.reward;
        match transition.next_state {
            Some(next) => {
                states.push(next.clone());
                state = next;
            }
            None => {
                return Ok(Rollout {
                    states,
                    total_return,
                    terminated: true,
                });
            }
        }
    }

    Ok(Rollout {
        states,
        total_return,
        terminated: false,
    })
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Training pipeline for a single learner in one environment
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `learner` in `env`.
    ///
    /// Each step the learner sees the transition together with the action it
    /// has already chosen for the next state, so SARSA-style updates need no
    /// lookahead of their own. Whole episodes are handed to
    /// [`Learner::learn_episode`] when they end; a truncated episode keeps the
    /// `next_state` of its last step.
    pub fn run<E: Environment>(
        &mut self,
        env: &E,
        learner: &mut dyn Learner<E>,
    ) -> Result<TrainingResult> {
        self.config.validate()?;
        let mut rng = build_rng(self.config.seed);
        if let Some(seed) = self.config.seed {
            learner.set_rng_seed(seed.wrapping_add(1))?;
        }

        for observer in &mut self.observers {
            observer.on_training_start(self.config.num_episodes)?;
        }

        let mut episodes = 0;
        let mut total_steps = 0;
        let mut terminated = 0;
        let mut total_return = 0.0;

        for episode in 0..self.config.num_episodes {
            if self
                .config
                .max_total_steps
                .is_some_and(|budget| total_steps > budget)
            {
                debug!(total_steps, "step budget exhausted");
                break;
            }

            let summary = self.play_episode(env, learner, episode, total_steps, &mut rng)?;
            debug!(
                episode,
                steps = summary.steps,
                total_return = summary.total_return,
                terminated = summary.terminated,
                "episode finished"
            );

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }

            episodes += 1;
            total_steps = summary.total_steps;
            total_return += summary.total_return;
            if summary.terminated {
                terminated += 1;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result = TrainingResult::new(
            episodes,
            total_steps,
            terminated,
            episodes - terminated,
            total_return,
        );
        info!(
            environment = env.name(),
            learner = learner.name(),
            episodes = result.episodes,
            total_steps = result.total_steps,
            mean_episode_length = result.mean_episode_length,
            "training finished"
        );
        Ok(result)
    }

    fn play_episode<E: Environment>(
        &mut self,
        env: &E,
        learner: &mut dyn Learner<E>,
        episode: usize,
        steps_before: usize,
        rng: &mut StdRng,
    ) -> Result<EpisodeSummary> {
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut state = env.initial_state(rng)?;
        let mut action = learner.select_action(env, &state)?;
        let mut trajectory: Vec<Step<E::State, E::Action>> = Vec::new();
        let mut total_return = 0.0;

        let terminated = loop {
            let transition = env.step(&state, action, rng)?;
            total_return += transition.reward;
            for observer in &mut self.observers {
                observer.on_step(episode, trajectory.len(), transition.reward)?;
            }

            let next_action = match &transition.next_state {
                Some(next) => Some(learner.select_action(env, next)?),
                None => None,
            };
            let step = Step {
                state,
                action,
                reward: transition.reward,
                next_state: transition.next_state,
                next_action,
            };
            learner.learn_step(env, &step)?;
            let next = step.next_state.clone().zip(step.next_action);
            trajectory.push(step);

            let Some((next_state, next_action)) = next else {
                break true;
            };
            if self
                .config
                .max_episode_steps
                .is_some_and(|limit| trajectory.len() >= limit)
            {
                break false;
            }
            state = next_state;
            action = next_action;
        };

        learner.learn_episode(env, &trajectory)?;

        Ok(EpisodeSummary {
            episode,
            steps: trajectory.len(),
            total_steps: steps_before + trajectory.len(),
            total_return,
            terminated,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        grid::Coordinate,
        gridworld::GridWorld,
        td_learning::{QLearningAgent, SarsaAgent, TdConfig},
        windy::{Move, WindyGridworld},
    };

    #[test]
    fn test_training_pipeline_counts_episodes() {
        let config = TrainingConfig {
            num_episodes: 20,
            max_episode_steps: Some(50),
            seed: Some(42),
            ..TrainingConfig::default()
        };
        let env = GridWorld::default();
        let mut agent: QLearningAgent<usize, usize> = QLearningAgent::new(TdConfig::gridworld());

        let result = TrainingPipeline::new(config).run(&env, &mut agent).unwrap();

        assert_eq!(result.episodes, 20);
        assert_eq!(result.terminated + result.truncated, 20);
        assert!(result.total_steps <= 20 * 50);
        assert!(agent.q_table().size() > 0);
    }

    #[test]
    fn test_step_budget_stops_training() {
        let config = TrainingConfig {
            num_episodes: usize::MAX,
            max_total_steps: Some(500),
            seed: Some(1),
            ..TrainingConfig::default()
        };
        let env = WindyGridworld::default();
        let mut agent: SarsaAgent<Coordinate, Move> = SarsaAgent::new(TdConfig::windy());

        let result = TrainingPipeline::new(config).run(&env, &mut agent).unwrap();

        assert!(result.total_steps > 500);
        assert_eq!(result.truncated, 0);
        assert!(result.episodes > 0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let config = TrainingConfig {
                num_episodes: 30,
                max_episode_steps: Some(100),
                seed: Some(9),
                ..TrainingConfig::default()
            };
            let env = GridWorld::default();
            let mut agent: QLearningAgent<usize, usize> =
                QLearningAgent::new(TdConfig::gridworld());
            TrainingPipeline::new(config).run(&env, &mut agent).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rollout_respects_step_limit() {
        let env = WindyGridworld::default();
        let agent: SarsaAgent<Coordinate, Move> = SarsaAgent::new(TdConfig::windy());
        let mut rng = StdRng::seed_from_u64(0);
        // An untrained greedy policy always moves left and never arrives.
        let result = rollout(&env, &agent, 10, &mut rng).unwrap();
        assert!(!result.terminated);
        assert_eq!(result.states.len(), 11);
        assert_eq!(result.steps(), 10);
        assert_eq!(result.total_return, -10.0);
    }

    #[test]
    fn test_training_result_json_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("result.json");
        let result = TrainingResult::new(4, 40, 3, 1, -40.0);
        assert_eq!(result.mean_episode_length, 10.0);
        assert_eq!(result.mean_return, -10.0);

        result.save(&path).unwrap();
        assert_eq!(TrainingResult::load(&path).unwrap(), result);
    }

    #[test]
    fn test_zero_episode_limit_is_rejected() {
        let config = TrainingConfig {
            max_episode_steps: Some(0),
            ..TrainingConfig::default()
        };
        let env = GridWorld::default();
        let mut agent: QLearningAgent<usize, usize> = QLearningAgent::new(TdConfig::gridworld());
        let result = TrainingPipeline::new(config).run(&env, &mut agent);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }
}
