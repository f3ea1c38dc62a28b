//! Racetrack RL CLI - Tabular reinforcement learning on grid worlds
//!
//! This CLI provides a unified interface for:
//! - Off-policy Monte Carlo control on race tracks
//! - SARSA on the windy gridworld and its variants
//! - Q-learning in a grid world with a random target
//! - Drawing rasterized line segments and track layouts

use anyhow::Result;
use clap::{Parser, Subcommand};
use racetrack_rl::cli::commands::{gridworld, racetrack, rasterize, track, windy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "racetrack-rl")]
#[command(version, about = "Tabular reinforcement learning on grid worlds", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); `RUST_LOG` takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn to drive a race track with off-policy Monte Carlo control
    Racetrack(Box<racetrack::RacetrackArgs>),

    /// Learn the windy gridworld with SARSA
    Windy(Box<windy::WindyArgs>),

    /// Learn to reach a random target with Q-learning
    Gridworld(Box<gridworld::GridworldArgs>),

    /// Rasterize line segments onto the integer grid
    Rasterize(rasterize::RasterizeArgs),

    /// Draw a race track layout
    ShowTrack(track::ShowTrackArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "racetrack_rl=debug",
        _ => "racetrack_rl=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Racetrack(args) => racetrack::execute(*args),
        Commands::Windy(args) => windy::execute(*args),
        Commands::Gridworld(args) => gridworld::execute(*args),
        Commands::Rasterize(args) => rasterize::execute(args),
        Commands::ShowTrack(args) => track::execute(args),
    }
}
