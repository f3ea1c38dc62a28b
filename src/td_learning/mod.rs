//! Q-learning and SARSA temporal difference learning
//!
//! TD methods bootstrap value estimates from successor states and update
//! after every transition.
//!
//! | Aspect | Q-learning | SARSA |
//! |--------|------------|-------|
//! | Policy | Off-policy (learns Q*) | On-policy (learns Q^π) |
//! | Update | Uses max_a Q(s',a') | Uses actual Q(s',a') |
//! | Used for | Grid world | Windy gridworld |
//!
//! ## Usage Example
//!
//! ```no_run
//! use racetrack_rl::grid::Coordinate;
//! use racetrack_rl::td_learning::{QLearningAgent, SarsaAgent, TdConfig};
//! use racetrack_rl::windy::Move;
//!
//! let sarsa: SarsaAgent<Coordinate, Move> = SarsaAgent::new(TdConfig::windy()).with_seed(1);
//! let q_learning: QLearningAgent<usize, usize> = QLearningAgent::new(TdConfig::gridworld());
//! ```

pub mod agent;
pub mod q_table;
pub mod serialization;

pub use agent::{QLearningAgent, SarsaAgent, TdConfig};
pub use q_table::QTable;
pub use serialization::{SavedTdAgent, TdAlgorithm, TdLearner};
