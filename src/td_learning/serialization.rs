//! Serialization support for temporal difference learning agents.

use std::{hash::Hash, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    Result,
    adapters::MsgPackRepository,
    error::Error,
    pipeline::TrainingMetadata,
    ports::{Environment, Learner, SnapshotRepository},
    td_learning::agent::{QLearningAgent, SarsaAgent, TdAgentState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TdAlgorithm {
    QLearning,
    Sarsa,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, A: Serialize",
    deserialize = "S: Deserialize<'de> + Eq + Hash, A: Deserialize<'de> + Eq + Hash"
))]
pub struct SavedTdAgent<S, A> {
    pub version: u32,
    pub algorithm: TdAlgorithm,
    state: TdAgentState<S, A>,
    pub metadata: TrainingMetadata,
}

pub enum TdLearner<S, A> {
    QLearning(QLearningAgent<S, A>),
    Sarsa(SarsaAgent<S, A>),
}

impl<S, A> TdLearner<S, A>
where
    S: Clone + Eq + Hash + Send + 'static,
    A: Copy + Eq + Hash + Send + 'static,
{
    pub fn into_box<E>(self) -> Box<dyn Learner<E>>
    where
        E: Environment<State = S, Action = A>,
    {
        match self {
            TdLearner::QLearning(agent) => Box::new(agent),
            TdLearner::Sarsa(agent) => Box::new(agent),
        }
    }
}

impl<S, A> SavedTdAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Copy + Eq + Hash,
{
    pub const VERSION: u32 = 1;

    pub fn from_q_learning(agent: &QLearningAgent<S, A>, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            algorithm: TdAlgorithm::QLearning,
            state: agent.export_state(),
            metadata,
        }
    }

    pub fn from_sarsa(agent: &SarsaAgent<S, A>, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            algorithm: TdAlgorithm::Sarsa,
            state: agent.export_state(),
            metadata,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSnapshotVersion`] for snapshots written by
    /// an incompatible format version.
    pub fn to_agent(&self) -> Result<TdLearner<S, A>> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }

        Ok(match self.algorithm {
            TdAlgorithm::QLearning => {
                TdLearner::QLearning(QLearningAgent::from_state(self.state.clone()))
            }
            TdAlgorithm::Sarsa => TdLearner::Sarsa(SarsaAgent::from_state(self.state.clone())),
        })
    }
}

impl<S, A> SavedTdAgent<S, A>
where
    S: Serialize + DeserializeOwned + Eq + Hash,
    A: Serialize + DeserializeOwned + Eq + Hash,
{
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        MsgPackRepository.save(self, path.as_ref())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        MsgPackRepository.load(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        adapters::InMemoryRepository,
        grid::Coordinate,
        gridworld::GridWorld,
        ports::Step,
        td_learning::TdConfig,
        windy::{Move, WindyGridworld},
    };

    #[test]
    fn test_sarsa_roundtrip() -> Result<()> {
        let env = WindyGridworld::default();
        let mut agent: SarsaAgent<Coordinate, Move> =
            SarsaAgent::new(TdConfig::windy()).with_seed(11);
        let mut rng = StdRng::seed_from_u64(11);
        let state = env.initial_state(&mut rng)?;
        let action = agent.select_action(&env, &state)?;
        let transition = env.step(&state, action, &mut rng)?;
        agent.learn_step(
            &env,
            &Step {
                state,
                action,
                reward: transition.reward,
                next_state: transition.next_state,
                next_action: Some(Move::UP),
            },
        )?;

        let saved = SavedTdAgent::from_sarsa(&agent, TrainingMetadata::default());
        let repo = InMemoryRepository::new();
        repo.save(&saved, Path::new("sarsa"))?;
        let loaded: SavedTdAgent<Coordinate, Move> = repo.load(Path::new("sarsa"))?;

        match loaded.to_agent()? {
            TdLearner::Sarsa(restored) => {
                assert_eq!(restored.q_table().size(), 1);
                assert_eq!(
                    restored.q_table().get(&state, action),
                    agent.q_table().get(&state, action)
                );
            }
            TdLearner::QLearning(_) => panic!("Expected SARSA agent"),
        }
        Ok(())
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let agent: QLearningAgent<usize, usize> = QLearningAgent::new(TdConfig::gridworld());
        let mut saved = SavedTdAgent::from_q_learning(&agent, TrainingMetadata::default());
        saved.version = 99;
        assert!(matches!(
            saved.to_agent(),
            Err(Error::UnsupportedSnapshotVersion { found: 99, expected: 1 })
        ));
    }

    #[test]
    fn test_restored_learner_boxes_for_its_environment() -> Result<()> {
        let agent: QLearningAgent<usize, usize> = QLearningAgent::new(TdConfig::gridworld());
        let saved = SavedTdAgent::from_q_learning(&agent, TrainingMetadata::default());
        let learner = saved.to_agent()?.into_box::<GridWorld>();
        assert_eq!(learner.name(), "Q-Learning");
        Ok(())
    }
}
