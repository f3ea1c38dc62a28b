//! CLI infrastructure for the racetrack toolkit
//!
//! This module provides the command-line interface for training agents on
//! the race track, the windy gridworld and the target grid world, and for
//! drawing rasterized lines and track layouts.

pub mod commands;
pub mod config;
pub mod output;
