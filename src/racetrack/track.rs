//! Track geometry: out-of-bounds, finish and start cells
//!
//! A track is assembled once from unions of axis-aligned rectangles and never
//! mutated afterwards. Layouts can be described as a [`TrackSpec`] and stored
//! as JSON.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    grid::Coordinate,
    render::{GridRenderer, Layer},
};

/// All cells of the inclusive rectangle spanned by `p1` and `p2`.
///
/// Corners may be given in any order.
pub fn rectangle_cells(p1: Coordinate, p2: Coordinate) -> BTreeSet<Coordinate> {
    let (min_x, max_x) = (p1.x.min(p2.x), p1.x.max(p2.x));
    let (min_y, max_y) = (p1.y.min(p2.y), p1.y.max(p2.y));
    (min_x..=max_x)
        .flat_map(|x| (min_y..=max_y).map(move |y| Coordinate::new(x, y)))
        .collect()
}

/// Corner pair of an axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub from: Coordinate,
    pub to: Coordinate,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            from: Coordinate::new(x1, y1),
            to: Coordinate::new(x2, y2),
        }
    }

    pub fn cells(&self) -> BTreeSet<Coordinate> {
        rectangle_cells(self.from, self.to)
    }
}

/// Serializable description of a track layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub rows: i32,
    pub cols: i32,
    pub bounds: Vec<Rect>,
    pub finish: Vec<Rect>,
    pub start: Vec<Rect>,
}

impl TrackSpec {
    /// The 32-row, 17-column track of the racetrack exercise.
    pub fn classic() -> Self {
        Self {
            rows: 32,
            cols: 17,
            bounds: vec![
                Rect::new(1, 32, 1, 29),
                Rect::new(1, 18, 1, 1),
                Rect::new(2, 32, 2, 30),
                Rect::new(2, 10, 2, 1),
                Rect::new(3, 32, 3, 32),
                Rect::new(3, 3, 3, 1),
                Rect::new(10, 25, 10, 1),
                Rect::new(11, 26, 17, 1),
            ],
            finish: vec![Rect::new(17, 32, 17, 27)],
            start: vec![Rect::new(4, 1, 9, 1)],
        }
    }

    pub fn build(&self) -> Result<TrackGeometry> {
        let mut builder = TrackGeometry::builder(self.rows, self.cols);
        for rect in &self.bounds {
            builder = builder.bounds_rect(rect.from, rect.to);
        }
        for rect in &self.finish {
            builder = builder.finish_rect(rect.from, rect.to);
        }
        for rect in &self.start {
            builder = builder.start_rect(rect.from, rect.to);
        }
        builder.build()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open track file {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create track file {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

impl Default for TrackSpec {
    fn default() -> Self {
        Self::classic()
    }
}

/// Immutable track description.
///
/// The legal area is `[1..=cols] × [1..=rows]`. `finish` and `start` cells
/// always lie inside it; `bounds` may also hold cells outside, which are
/// simply unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackGeometry {
    rows: i32,
    cols: i32,
    bounds: BTreeSet<Coordinate>,
    finish: BTreeSet<Coordinate>,
    start: BTreeSet<Coordinate>,
}

impl TrackGeometry {
    pub fn builder(rows: i32, cols: i32) -> TrackBuilder {
        TrackBuilder {
            rows,
            cols,
            bounds: BTreeSet::new(),
            finish: BTreeSet::new(),
            start: BTreeSet::new(),
        }
    }

    pub fn classic() -> Result<Self> {
        TrackSpec::classic().build()
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn bounds(&self) -> &BTreeSet<Coordinate> {
        &self.bounds
    }

    pub fn finish(&self) -> &BTreeSet<Coordinate> {
        &self.finish
    }

    pub fn start(&self) -> &BTreeSet<Coordinate> {
        &self.start
    }

    /// Whether `cell` lies inside `[1..=cols] × [1..=rows]`.
    pub fn in_range(&self, cell: Coordinate) -> bool {
        (1..=self.cols).contains(&cell.x) && (1..=self.rows).contains(&cell.y)
    }

    /// In-range cells that are not out of bounds.
    pub fn drivable_cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (1..=self.cols)
            .flat_map(move |x| (1..=self.rows).map(move |y| Coordinate::new(x, y)))
            .filter(|cell| !self.bounds.contains(cell))
    }

    /// Text picture of the track: `#` bounds, `|` finish, `_` start.
    pub fn render(&self) -> String {
        GridRenderer::new().render(
            Coordinate::new(1, 1),
            Coordinate::new(self.cols, self.rows),
            &self.layers(),
        )
    }

    pub(crate) fn layers(&self) -> Vec<Layer> {
        vec![
            Layer::new('#', self.bounds.iter().copied()),
            Layer::new('|', self.finish.iter().copied()),
            Layer::new('_', self.start.iter().copied()),
        ]
    }
}

/// Builder assembling a [`TrackGeometry`] from rectangle unions.
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    rows: i32,
    cols: i32,
    bounds: BTreeSet<Coordinate>,
    finish: BTreeSet<Coordinate>,
    start: BTreeSet<Coordinate>,
}

impl TrackBuilder {
    pub fn bounds_rect(mut self, p1: Coordinate, p2: Coordinate) -> Self {
        self.bounds.extend(rectangle_cells(p1, p2));
        self
    }

    pub fn finish_rect(mut self, p1: Coordinate, p2: Coordinate) -> Self {
        self.finish.extend(rectangle_cells(p1, p2));
        self
    }

    pub fn start_rect(mut self, p1: Coordinate, p2: Coordinate) -> Self {
        self.start.extend(rectangle_cells(p1, p2));
        self
    }

    /// Validate and freeze the track.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTrack`] if the extents are not positive, if
    /// there are no start cells, or if a start or finish cell lies outside
    /// the legal area.
    pub fn build(self) -> Result<TrackGeometry> {
        if self.rows < 1 || self.cols < 1 {
            return Err(Error::InvalidTrack {
                message: format!(
                    "extents must be positive, got {} rows and {} cols",
                    self.rows, self.cols
                ),
            });
        }
        if self.start.is_empty() {
            return Err(Error::InvalidTrack {
                message: "at least one start cell is required".to_string(),
            });
        }

        let geometry = TrackGeometry {
            rows: self.rows,
            cols: self.cols,
            bounds: self.bounds,
            finish: self.finish,
            start: self.start,
        };

        let stray = geometry
            .start
            .iter()
            .chain(geometry.finish.iter())
            .find(|cell| !geometry.in_range(**cell));
        if let Some(cell) = stray {
            return Err(Error::InvalidTrack {
                message: format!(
                    "cell {cell} lies outside [1..={}] x [1..={}]",
                    geometry.cols, geometry.rows
                ),
            });
        }

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_cells_reversed_corners() {
        let forward = rectangle_cells(Coordinate::new(1, 1), Coordinate::new(2, 3));
        let reversed = rectangle_cells(Coordinate::new(2, 3), Coordinate::new(1, 1));
        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 6);
    }

    #[test]
    fn test_rectangle_cells_single_cell() {
        let cells = rectangle_cells(Coordinate::new(3, 32), Coordinate::new(3, 32));
        assert_eq!(cells.into_iter().collect::<Vec<_>>(), vec![Coordinate::new(3, 32)]);
    }

    #[test]
    fn test_classic_track_layout() {
        let track = TrackGeometry::classic().unwrap();
        assert_eq!(track.rows(), 32);
        assert_eq!(track.cols(), 17);
        assert_eq!(track.start().len(), 6);
        assert_eq!(track.finish().len(), 6);
        assert!(track.bounds().contains(&Coordinate::new(10, 1)));
        assert!(!track.bounds().contains(&Coordinate::new(10, 26)));
        assert!(track.finish().contains(&Coordinate::new(17, 27)));
        assert!(track.start().iter().all(|cell| cell.y == 1));
    }

    #[test]
    fn test_rejects_empty_start() {
        let result = TrackGeometry::builder(5, 5)
            .finish_rect(Coordinate::new(5, 1), Coordinate::new(5, 5))
            .build();
        assert!(matches!(result, Err(Error::InvalidTrack { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_finish() {
        let result = TrackGeometry::builder(5, 5)
            .start_rect(Coordinate::new(1, 1), Coordinate::new(1, 1))
            .finish_rect(Coordinate::new(6, 1), Coordinate::new(6, 5))
            .build();
        assert!(matches!(result, Err(Error::InvalidTrack { .. })));
    }

    #[test]
    fn test_overlapping_rectangles_are_idempotent() {
        let once = TrackGeometry::builder(4, 4)
            .bounds_rect(Coordinate::new(4, 1), Coordinate::new(4, 2))
            .start_rect(Coordinate::new(1, 1), Coordinate::new(2, 1))
            .build()
            .unwrap();
        let twice = TrackGeometry::builder(4, 4)
            .bounds_rect(Coordinate::new(4, 1), Coordinate::new(4, 2))
            .bounds_rect(Coordinate::new(4, 2), Coordinate::new(4, 1))
            .start_rect(Coordinate::new(1, 1), Coordinate::new(2, 1))
            .start_rect(Coordinate::new(2, 1), Coordinate::new(2, 1))
            .build()
            .unwrap();
        assert_eq!(once, twice);
        assert_eq!(TrackGeometry::classic().unwrap(), TrackGeometry::classic().unwrap());
    }

    #[test]
    fn test_bounds_may_leave_the_legal_area() {
        let track = TrackGeometry::builder(3, 3)
            .start_rect(Coordinate::new(1, 1), Coordinate::new(1, 1))
            .bounds_rect(Coordinate::new(0, 0), Coordinate::new(4, 0))
            .build()
            .unwrap();
        assert_eq!(track.bounds().len(), 5);
    }

    #[test]
    fn test_render_marks_layers() {
        let track = TrackGeometry::builder(2, 3)
            .bounds_rect(Coordinate::new(3, 1), Coordinate::new(3, 2))
            .finish_rect(Coordinate::new(2, 2), Coordinate::new(2, 2))
            .start_rect(Coordinate::new(1, 1), Coordinate::new(1, 1))
            .build()
            .unwrap();
        assert_eq!(track.render(), "  | # \n_   # \n");
    }

    #[test]
    fn test_spec_json_roundtrip() {
        let spec = TrackSpec::classic();
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: TrackSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
        assert_eq!(parsed.build().unwrap(), spec.build().unwrap());
    }
}
