//! Show-track command - Draw a track layout and optionally export it

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{format_number, print_section, print_stats_table},
    racetrack::TrackSpec,
};

#[derive(Parser, Debug)]
#[command(about = "Draw a race track")]
pub struct ShowTrackArgs {
    /// Track layout as JSON; the classic track when omitted
    #[arg(long)]
    pub track: Option<PathBuf>,

    /// Write the layout as JSON, e.g. as a starting point for a custom track
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: ShowTrackArgs) -> Result<()> {
    let spec = match &args.track {
        Some(path) => TrackSpec::load(path)
            .with_context(|| format!("Failed to load track from {}", path.display()))?,
        None => TrackSpec::classic(),
    };
    let geometry = spec.build()?;

    print_section("Track");
    print!("{}", geometry.render());
    println!();
    print_stats_table(&[
        ("Size", &format!("{} x {}", geometry.cols(), geometry.rows())),
        ("Out of bounds", &format_number(geometry.bounds().len())),
        ("Finish cells", &format_number(geometry.finish().len())),
        ("Start cells", &format_number(geometry.start().len())),
        ("Drivable cells", &format_number(geometry.drivable_cells().count())),
    ]);

    if let Some(path) = &args.export {
        spec.save(path)
            .with_context(|| format!("Failed to export track to {}", path.display()))?;
        println!("\nTrack exported to {}", path.display());
    }
    Ok(())
}
