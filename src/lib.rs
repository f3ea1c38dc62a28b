//! Tabular reinforcement learning on grid worlds
//!
//! This crate provides:
//! - Line rasterization on the integer grid and text rendering of grid layers
//! - Race track geometry and the car's transition function
//! - Off-policy Monte Carlo control for the race track
//! - The windy gridworld with SARSA and Q-learning agents
//! - A gym-style grid world with a randomly placed target
//! - A training pipeline with composable observers and saved agents

pub mod adapters;
pub mod cli;
pub mod error;
pub mod grid;
pub mod gridworld;
pub mod monte_carlo;
pub mod pipeline;
pub mod ports;
pub mod racetrack;
pub mod raster;
pub mod render;
pub mod td_learning;
pub mod windy;

pub use error::{Error, Result};
pub use grid::Coordinate;
pub use gridworld::{GridWorld, GridWorldEnv};
pub use monte_carlo::MonteCarloAgent;
pub use racetrack::{Acceleration, CarState, Outcome, RaceTrack, TrackGeometry, Velocity};
pub use raster::rasterize;
pub use render::{GridRenderer, Layer};
pub use td_learning::{QLearningAgent, SarsaAgent};
pub use windy::WindyGridworld;
