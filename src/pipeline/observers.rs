//! Observer implementations for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    ports::{EpisodeSummary, Observer},
};

/// Shared observers stay readable after the pipeline takes ownership of a
/// clone of the handle.
impl<O: Observer> Observer for Arc<Mutex<O>> {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        lock(self).on_training_start(total_episodes)
    }

    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        lock(self).on_episode_start(episode)
    }

    fn on_step(&mut self, episode: usize, step: usize, reward: f64) -> Result<()> {
        lock(self).on_step(episode, step, reward)
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        lock(self).on_episode_end(summary)
    }

    fn on_training_end(&mut self) -> Result<()> {
        lock(self).on_training_end()
    }
}

fn lock<O>(shared: &Mutex<O>) -> std::sync::MutexGuard<'_, O> {
    shared
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    total_steps: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            total_steps: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.total_steps = summary.total_steps;
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(format!(
                "last: {} steps, total: {}",
                summary.steps, summary.total_steps
            ));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("{} steps", self.total_steps));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks per-episode lengths and returns
#[derive(Debug, Default)]
pub struct MetricsObserver {
    episode_lengths: Vec<usize>,
    returns: Vec<f64>,
    terminated: usize,
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub total_steps: usize,
    pub terminated: usize,
    pub mean_episode_length: f64,
    pub mean_return: f64,
    pub shortest_episode: Option<usize>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A metrics observer that can be read after training.
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn episode_lengths(&self) -> &[usize] {
        &self.episode_lengths
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Mean length of the last `window` episodes
    pub fn recent_mean_length(&self, window: usize) -> f64 {
        let start = self.episode_lengths.len().saturating_sub(window);
        mean_length(&self.episode_lengths[start..])
    }

    pub fn summary(&self) -> MetricsSummary {
        let episodes = self.returns.len();
        MetricsSummary {
            episodes,
            total_steps: self.episode_lengths.iter().sum(),
            terminated: self.terminated,
            mean_episode_length: mean_length(&self.episode_lengths),
            mean_return: if episodes == 0 {
                0.0
            } else {
                self.returns.iter().sum::<f64>() / episodes as f64
            },
            shortest_episode: self.episode_lengths.iter().copied().min(),
        }
    }
}

fn mean_length(lengths: &[usize]) -> f64 {
    if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episode_lengths.push(summary.steps);
        self.returns.push(summary.total_return);
        if summary.terminated {
            self.terminated += 1;
        }
        Ok(())
    }
}

/// One point of the steps-versus-episodes learning curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub total_steps: usize,
    pub episodes: usize,
}

/// Learning curve observer - Writes cumulative steps against completed
/// episodes as CSV, starting from the origin
pub struct LearningCurveObserver {
    writer: csv::Writer<File>,
}

impl LearningCurveObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }
}

impl Observer for LearningCurveObserver {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        self.writer.serialize(CurvePoint {
            total_steps: 0,
            episodes: 0,
        })?;
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.writer.serialize(CurvePoint {
            total_steps: summary.total_steps,
            episodes: summary.episode + 1,
        })?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// JSONL observer - Exports one episode summary per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
