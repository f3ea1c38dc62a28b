//! Windy command - SARSA on the windy gridworld

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
    grid::Coordinate,
    pipeline::{
        LearningCurveObserver, MetricsObserver, MetricsSummary, TrainingConfig, TrainingMetadata,
        TrainingPipeline, TrainingResult,
    },
    td_learning::{SarsaAgent, SavedTdAgent, TdConfig},
    windy::{Move, WindyGridworld, WindyVariant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    /// Four moves, steady wind
    Standard,
    /// Eight moves plus standing still, steady wind
    King,
    /// King moves, wind varying by one around its mean
    Stochastic,
}

impl From<VariantArg> for WindyVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Standard => WindyVariant::Standard,
            VariantArg::King => WindyVariant::KingMoves,
            VariantArg::Stochastic => WindyVariant::StochasticWind,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Learn the windy gridworld with SARSA")]
pub struct WindyArgs {
    /// Gridworld variant
    #[arg(long, value_enum, default_value_t = VariantArg::Standard)]
    pub variant: VariantArg,

    /// Stop starting new episodes once this many steps were taken
    #[arg(long, default_value_t = 8000)]
    pub step_budget: usize,

    /// Upper bound on training episodes
    #[arg(long, default_value_t = 10_000)]
    pub episodes: usize,

    /// Write the steps-versus-episodes learning curve as CSV
    #[arg(long)]
    pub curve: Option<PathBuf>,

    /// Step size α
    #[arg(long, default_value_t = 0.5)]
    pub learning_rate: f64,

    /// Exploration rate ε
    #[arg(long, default_value_t = 0.1)]
    pub epsilon: f64,

    /// Output file for the trained agent
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub demo: DemoArgs,
}

#[derive(Debug, Serialize)]
struct WindySummary<'a> {
    variant: WindyVariant,
    training: &'a TrainingResult,
    metrics: MetricsSummary,
    recent_mean_length: f64,
    config: TdConfig,
    seed: Option<u64>,
}

pub fn execute(args: WindyArgs) -> Result<()> {
    let variant = WindyVariant::from(args.variant);
    let world = WindyGridworld::new(variant);
    let td_config = TdConfig {
        learning_rate: args.learning_rate,
        epsilon: args.epsilon,
        ..TdConfig::windy()
    };
    td_config.validate()?;

    // Reaching the goal ends the episode, so its value is fixed at zero.
    let mut agent: SarsaAgent<Coordinate, Move> =
        SarsaAgent::new(td_config).with_state_value(world.goal(), 0.0);

    print_section("Windy gridworld: SARSA");
    print_kv("Variant", &format!("{variant:?}"));
    print_kv("Step budget", &format_number(args.step_budget));
    print_kv("Moves", &world.moves().len().to_string());

    let config = TrainingConfig {
        num_episodes: args.episodes,
        max_total_steps: Some(args.step_budget),
        seed: args.common.seed,
        ..TrainingConfig::default()
    };
    let metrics = MetricsObserver::shared();
    let mut pipeline = args
        .common
        .attach_observers(TrainingPipeline::new(config))?
        .with_observer(Box::new(Arc::clone(&metrics)));
    if let Some(path) = &args.curve {
        let curve = LearningCurveObserver::new(path)
            .with_context(|| format!("Failed to create curve file {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(curve));
    }
    let result = pipeline.run(&world, &mut agent)?;

    print_subsection("Training");
    print_training_result(&result);
    let (summary, recent) = read_metrics(&metrics);
    if let Some(shortest) = summary.shortest_episode {
        print_kv("Shortest episode", &format_number(shortest));
    }
    print_kv("Last 10 mean", &format!("{recent:.2}"));
    if let Some(path) = &args.curve {
        println!("\nLearning curve written to {}", path.display());
    }

    if let Some(path) = &args.common.summary {
        let file = WindySummary {
            variant,
            training: &result,
            metrics: summary,
            recent_mean_length: recent,
            config: td_config,
            seed: args.common.seed,
        };
        let written = write_summary(path, &file)?;
        println!("\nSummary written to {}", written.display());
    }

    if let Some(path) = &args.output {
        let metadata = TrainingMetadata::from_result("windy-gridworld", &result, args.common.seed);
        SavedTdAgent::from_sarsa(&agent, metadata)
            .save_to_file(path)
            .with_context(|| format!("Failed to save agent to {}", path.display()))?;
        println!("\nAgent saved to {}", path.display());
    }

    if args.demo.demo {
        play_demo(&world, &agent, &args.demo, args.common.seed)?;
    }

    Ok(())
}

fn read_metrics(metrics: &Mutex<MetricsObserver>) -> (MetricsSummary, f64) {
    let metrics = metrics
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    (metrics.summary(), metrics.recent_mean_length(10))
}
