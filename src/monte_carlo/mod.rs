//! Monte Carlo control for the race track
//!
//! Learns from complete episodes: the agent drives with a random behaviour
//! policy and improves a deterministic target policy off-policy, correcting
//! for the mismatch with weighted importance sampling.

pub mod agent;
pub mod serialization;

pub use agent::{MonteCarloAgent, MonteCarloConfig};
pub use serialization::SavedMonteCarloAgent;
