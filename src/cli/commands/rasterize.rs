//! Rasterize command - Print the cells a line segment passes through

use std::str::FromStr;

use anyhow::{Result, bail};
use clap::Parser;

use crate::{
    cli::output::print_section,
    grid::Coordinate,
    raster::rasterize,
    render::{GridRenderer, Layer},
};

/// Segment written as `x1,y1:x2,y2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: Coordinate,
    pub end: Coordinate,
}

impl Segment {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            start: Coordinate::new(x1, y1),
            end: Coordinate::new(x2, y2),
        }
    }
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("expected `x1,y1:x2,y2`, got `{s}`"))?;
        Ok(Self {
            start: parse_point(start)?,
            end: parse_point(end)?,
        })
    }
}

fn parse_point(s: &str) -> std::result::Result<Coordinate, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("invalid coordinate `{v}`: {e}"))
    };
    Ok(Coordinate::new(parse(x)?, parse(y)?))
}

/// Drawn when no segment is given: two axes and a steep diagonal.
const SAMPLE: [Segment; 3] = [
    Segment::new(0, 0, 0, 20),
    Segment::new(0, 0, 20, 0),
    Segment::new(3, 8, 8, 1),
];

#[derive(Parser, Debug)]
#[command(about = "Rasterize line segments onto the integer grid", allow_negative_numbers = true)]
pub struct RasterizeArgs {
    /// Segments as `x1,y1:x2,y2`; a sample picture when omitted
    pub segments: Vec<Segment>,

    /// Blank cells around the drawing
    #[arg(long, default_value_t = 1)]
    pub margin: i32,

    /// Only list the cells, skip the picture
    #[arg(long, default_value_t = false)]
    pub no_picture: bool,
}

pub fn execute(args: RasterizeArgs) -> Result<()> {
    if args.margin < 0 {
        bail!("margin must not be negative");
    }
    let segments = if args.segments.is_empty() {
        SAMPLE.to_vec()
    } else {
        args.segments.clone()
    };

    print_section("Rasterized segments");
    let mut cells = Vec::new();
    for segment in &segments {
        let line = rasterize(segment.start, segment.end);
        let listing: Vec<String> = line.iter().map(ToString::to_string).collect();
        println!("{} -> {}: {}", segment.start, segment.end, listing.join(" "));
        cells.extend(line);
    }

    if !args.no_picture {
        let (bottom_left, top_right) = window(&cells, args.margin);
        println!();
        print!(
            "{}",
            GridRenderer::new()
                .with_blank('.')
                .render(bottom_left, top_right, &[Layer::new('#', cells)])
        );
    }
    Ok(())
}

/// Bounding box of `cells`, grown by `margin` on every side.
fn window(cells: &[Coordinate], margin: i32) -> (Coordinate, Coordinate) {
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let max_x = cells.iter().map(|c| c.x).max().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);
    (
        Coordinate::new(min_x - margin, min_y - margin),
        Coordinate::new(max_x + margin, max_y + margin),
    )
}
