//! Gridworld command - Q-learning an agent that walks to a random target

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{
        config::{CommonArgs, DemoArgs},
        output::{
            format_number, print_kv, print_section, print_subsection, print_training_result,
            write_summary,
        },
    },
    gridworld::{GridWorld, GridWorldEnv, RenderMode},
    pipeline::{
        Learner, MetricsObserver, TrainingConfig, TrainingMetadata, TrainingPipeline,
        TrainingResult,
    },
    td_learning::{QLearningAgent, SavedTdAgent, TdConfig},
};

#[derive(Parser, Debug)]
#[command(about = "Learn to reach a randomly placed target with Q-learning")]
pub struct GridworldArgs {
    /// Side length of the square grid
    #[arg(long, default_value_t = 5)]
    pub size: usize,

    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 5000)]
    pub episodes: usize,

    /// Step size α
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Exploration rate ε
    #[arg(long, default_value_t = 0.1)]
    pub epsilon: f64,

    /// Truncate episodes after this many steps
    #[arg(long, default_value_t = 300)]
    pub max_episode_steps: usize,

    /// Output file for the trained agent
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub demo: DemoArgs,
}

#[derive(Debug, Serialize)]
struct GridworldSummary<'a> {
    size: usize,
    training: &'a TrainingResult,
    recent_mean_length: f64,
    q_entries: usize,
    config: TdConfig,
    seed: Option<u64>,
}

pub fn execute(args: GridworldArgs) -> Result<()> {
    let world = GridWorld::new(args.size)?;
    let td_config = TdConfig {
        learning_rate: args.learning_rate,
        epsilon: args.epsilon,
        ..TdConfig::gridworld()
    };
    td_config.validate()?;
    let mut agent: QLearningAgent<usize, usize> = QLearningAgent::new(td_config);

    print_section("Gridworld: Q-learning");
    print_kv("Grid", &format!("{0} x {0}", world.size()));
    print_kv("Observations", &format_number(world.observation_space().n()));
    print_kv("Episodes", &format_number(args.episodes));

    let config = TrainingConfig {
        num_episodes: args.episodes,
        max_episode_steps: Some(args.max_episode_steps),
        seed: args.common.seed,
        ..TrainingConfig::default()
    };
    let metrics = MetricsObserver::shared();
    let mut pipeline = args
        .common
        .attach_observers(TrainingPipeline::new(config))?
        .with_observer(Box::new(Arc::clone(&metrics)));
    let result = pipeline.run(&world, &mut agent)?;

    print_subsection("Training");
    print_training_result(&result);
    let recent = metrics
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .recent_mean_length(100);
    print_kv("Last 100 mean", &format!("{recent:.2}"));
    print_kv("Q entries", &format_number(agent.q_table().size()));

    if let Some(path) = &args.common.summary {
        let summary = GridworldSummary {
            size: world.size(),
            training: &result,
            recent_mean_length: recent,
            q_entries: agent.q_table().size(),
            config: td_config,
            seed: args.common.seed,
        };
        let written = write_summary(path, &summary)?;
        println!("\nSummary written to {}", written.display());
    }

    if let Some(path) = &args.output {
        let metadata = TrainingMetadata::from_result("gridworld", &result, args.common.seed);
        SavedTdAgent::from_q_learning(&agent, metadata)
            .save_to_file(path)
            .with_context(|| format!("Failed to save agent to {}", path.display()))?;
        println!("\nAgent saved to {}", path.display());
    }

    if args.demo.demo {
        demo(world, &agent, &args)?;
    }

    Ok(())
}

/// Drive the stateful environment with the greedy policy.
fn demo(world: GridWorld, agent: &QLearningAgent<usize, usize>, args: &GridworldArgs) -> Result<()> {
    let mut env = GridWorldEnv::new(world, Some(RenderMode::Ansi))
        .with_max_episode_steps(args.demo.max_steps);
    let (mut observation, info) = env.reset(args.common.seed);

    print_subsection("Greedy run");
    print_kv("Start distance", &info.distance.to_string());
    if let Some(frame) = env.render() {
        println!("{frame}");
    }

    let mut steps = 0;
    let reached = loop {
        let action = Learner::<GridWorld>::greedy_action(agent, env.world(), &observation)?;
        let result = env.step(action)?;
        steps += 1;
        args.demo.pause();
        if let Some(frame) = env.render() {
            println!("{frame}");
        }
        observation = result.observation;
        if result.terminated || result.truncated {
            break result.terminated;
        }
    };
    env.close();

    print_kv("Steps", &format_number(steps));
    print_kv("Reached target", if reached { "yes" } else { "no" });
    Ok(())
}
