//! Shared argument groups for CLI commands

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Args;

use crate::pipeline::{JsonlObserver, ProgressObserver, TrainingPipeline};

/// Options every training command accepts
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for per-episode JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,
}

impl CommonArgs {
    /// Attach the observers these options ask for.
    pub fn attach_observers(&self, mut pipeline: TrainingPipeline) -> Result<TrainingPipeline> {
        if self.progress {
            pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
        }
        if let Some(path) = &self.observations {
            let observer = JsonlObserver::new(path)
                .with_context(|| format!("Failed to create observations file {}", path.display()))?;
            pipeline = pipeline.with_observer(Box::new(observer));
        }
        Ok(pipeline)
    }
}

/// Options for replaying the greedy policy after training
#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Print a greedy run of the learned policy
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Pause between demo frames, in milliseconds
    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,

    /// Stop the demo after this many steps
    #[arg(long, default_value_t = 100)]
    pub max_steps: usize,
}

impl DemoArgs {
    pub fn pause(&self) {
        if self.delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.delay_ms));
        }
    }
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            demo: false,
            delay_ms: 100,
            max_steps: 100,
        }
    }
}
