//! Racetrack command - Off-policy Monte Carlo control on a race track

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use super::play_demo;
use crate::{
    cli::{
        config::{CommonArgs, DemoArgs},
        output::{
            format_number, print_kv, print_section, print_subsection, print_training_result,
            write_summary,
        },
    },
    monte_carlo::{MonteCarloAgent, MonteCarloConfig, SavedMonteCarloAgent},
    pipeline::{MetricsObserver, TrainingConfig, TrainingMetadata, TrainingPipeline, TrainingResult},
    racetrack::{RaceTrack, TrackSpec, VelocityLimits},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LimitsArg {
    /// Each component in [-4, 4], never both zero
    Bidirectional,
    /// Each component in [0, 4], never both zero
    ForwardOnly,
}

impl From<LimitsArg> for VelocityLimits {
    fn from(value: LimitsArg) -> Self {
        match value {
            LimitsArg::Bidirectional => VelocityLimits::bidirectional(),
            LimitsArg::ForwardOnly => VelocityLimits::forward_only(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Learn to drive a race track with off-policy Monte Carlo control")]
pub struct RacetrackArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: usize,

    /// Track layout as JSON; the saved agent's track with `--load`, else the
    /// classic track
    #[arg(long)]
    pub track: Option<PathBuf>,

    /// Velocity limits of the car; the saved agent's limits with `--load`,
    /// else bidirectional
    #[arg(long, value_enum)]
    pub velocity_limits: Option<LimitsArg>,

    /// Truncate episodes after this many steps; truncated episodes are not
    /// learned from
    #[arg(long)]
    pub max_episode_steps: Option<usize>,

    /// Initial action value
    #[arg(long, default_value_t = -1000.0, allow_negative_numbers = true)]
    pub q_init: f64,

    /// Continue training a saved agent
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Output file for the trained agent
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub demo: DemoArgs,
}

#[derive(Debug, Serialize)]
struct RacetrackSummary<'a> {
    training: &'a TrainingResult,
    shortest_episode: Option<usize>,
    recent_mean_length: f64,
    policy_states: usize,
    limits: VelocityLimits,
    seed: Option<u64>,
}

pub fn execute(args: RacetrackArgs) -> Result<()> {
    let saved = match &args.load {
        Some(path) => Some(
            SavedMonteCarloAgent::load_from_file(path)
                .with_context(|| format!("Failed to load agent from {}", path.display()))?,
        ),
        None => None,
    };

    // Explicit flags win over the layout and limits stored with a saved agent.
    let spec = match &args.track {
        Some(path) => TrackSpec::load(path)
            .with_context(|| format!("Failed to load track from {}", path.display()))?,
        None => saved
            .as_ref()
            .and_then(|saved| saved.track.clone())
            .unwrap_or_else(TrackSpec::classic),
    };
    let limits = match (args.velocity_limits, &saved) {
        (Some(limits), _) => VelocityLimits::from(limits),
        (None, Some(saved)) => saved.limits,
        (None, None) => VelocityLimits::bidirectional(),
    };
    let track = RaceTrack::new(spec.build()?).with_limits(limits);

    let mut agent = match &saved {
        Some(saved) => saved.to_agent()?,
        None => MonteCarloAgent::new(MonteCarloConfig {
            q_init: args.q_init,
            ..MonteCarloConfig::default()
        }),
    };

    print_section("Racetrack: off-policy Monte Carlo control");
    print_kv("Track", &format!("{} x {}", spec.cols, spec.rows));
    print_kv("Episodes", &format_number(args.episodes));
    if let Some(seed) = args.common.seed {
        print_kv("Seed", &seed.to_string());
    }

    let config = TrainingConfig {
        num_episodes: args.episodes,
        max_episode_steps: args.max_episode_steps,
        seed: args.common.seed,
        ..TrainingConfig::default()
    };
    let metrics = MetricsObserver::shared();
    let mut pipeline = args
        .common
        .attach_observers(TrainingPipeline::new(config))?
        .with_observer(Box::new(Arc::clone(&metrics)));
    let result = pipeline.run(&track, &mut agent)?;

    print_subsection("Training");
    print_training_result(&result);
    let (shortest, recent) = read_metrics(&metrics);
    if let Some(shortest) = shortest {
        print_kv("Shortest episode", &format_number(shortest));
    }
    print_kv("Last 100 mean", &format!("{recent:.2}"));
    print_kv("Policy states", &format_number(agent.policy_size()));

    if let Some(path) = &args.common.summary {
        let summary = RacetrackSummary {
            training: &result,
            shortest_episode: shortest,
            recent_mean_length: recent,
            policy_states: agent.policy_size(),
            limits,
            seed: args.common.seed,
        };
        let written = write_summary(path, &summary)?;
        println!("\nSummary written to {}", written.display());
    }

    if let Some(path) = &args.output {
        let metadata = TrainingMetadata::from_result("racetrack", &result, args.common.seed);
        SavedMonteCarloAgent::new(&agent, metadata)
            .with_track(spec.clone(), limits)
            .save_to_file(path)
            .with_context(|| format!("Failed to save agent to {}", path.display()))?;
        println!("\nAgent saved to {}", path.display());
    }

    if args.demo.demo {
        play_demo(&track, &agent, &args.demo, args.common.seed)?;
    }

    Ok(())
}

fn read_metrics(metrics: &Mutex<MetricsObserver>) -> (Option<usize>, f64) {
    let metrics = metrics
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    (
        metrics.summary().shortest_episode,
        metrics.recent_mean_length(100),
    )
}
