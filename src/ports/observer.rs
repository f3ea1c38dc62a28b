//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Summary of a finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Index of the episode (0-based)
    pub episode: usize,
    /// Steps taken in this episode
    pub steps: usize,
    /// Steps taken since training started, including this episode
    pub total_steps: usize,
    /// Undiscounted sum of rewards
    pub total_return: f64,
    /// `false` when the episode was cut off by a step limit
    pub terminated: bool,
}

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` - For each transition
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use racetrack_rl::ports::{EpisodeSummary, Observer};
///
/// struct LongestEpisode {
///     steps: usize,
/// }
///
/// impl Observer for LongestEpisode {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> racetrack_rl::Result<()> {
///         self.steps = self.steps.max(summary.steps);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first episode with the configured episode count.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after every transition with the reward received.
    fn on_step(&mut self, _episode: usize, _step: usize, _reward: f64) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
