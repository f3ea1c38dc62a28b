//! Line rasterization on the integer grid
//!
//! [`rasterize`] approximates the straight segment between two cells by the
//! ordered list of cells it passes through. The race track uses it to test the
//! whole swept path of a move for boundary and finish crossings, not just the
//! cell the car lands on.
//!
//! ## Rounding
//!
//! Offsets along the secondary axis are rounded half-to-even
//! ([`f64::round_ties_even`]). A segment from `(0, 0)` to `(4, 2)` therefore
//! passes through `(1, 0)` and `(3, 2)`: both half-way offsets round towards
//! the even neighbour.

use crate::grid::Coordinate;

/// Cells crossed by the segment from `start` to `end`, both included.
///
/// The result is ordered by increasing primary coordinate (`x` for lines
/// closer to horizontal, `y` otherwise), independent of argument order, so the
/// first element is not necessarily `start`. Consecutive cells are always
/// king-move neighbours.
///
/// Any pair of `i32` cells is accepted; the path has `max(|dx|, |dy|) + 1`
/// cells, so only the length of the result bounds the usable range.
///
/// # Examples
///
/// ```
/// use racetrack_rl::{Coordinate, rasterize};
///
/// let path = rasterize(Coordinate::new(3, 3), Coordinate::new(0, 0));
/// assert_eq!(path.first(), Some(&Coordinate::new(0, 0)));
/// assert_eq!(path.len(), 4);
/// ```
pub fn rasterize(start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
    if start.y == end.y {
        let (low, high) = (start.x.min(end.x), start.x.max(end.x));
        return (low..=high).map(|x| Coordinate::new(x, start.y)).collect();
    }
    if start.x == end.x {
        let (low, high) = (start.y.min(end.y), start.y.max(end.y));
        return (low..=high).map(|y| Coordinate::new(start.x, y)).collect();
    }

    // Deltas of any two i32 values fit in i64.
    let dx = i64::from(end.x) - i64::from(start.x);
    let dy = i64::from(end.y) - i64::from(start.y);
    let slope = dy as f64 / dx as f64;

    if slope.abs() <= 1.0 {
        let (p1, p2) = if start.x <= end.x {
            (start, end)
        } else {
            (end, start)
        };
        (0..=i64::from(p2.x) - i64::from(p1.x))
            .map(|step| {
                cell(
                    i64::from(p1.x) + step,
                    i64::from(p1.y) + round_offset(step as f64 * slope),
                )
            })
            .collect()
    } else {
        let (p1, p2) = if start.y <= end.y {
            (start, end)
        } else {
            (end, start)
        };
        let inverse = 1.0 / slope;
        (0..=i64::from(p2.y) - i64::from(p1.y))
            .map(|step| {
                cell(
                    i64::from(p1.x) + round_offset(step as f64 * inverse),
                    i64::from(p1.y) + step,
                )
            })
            .collect()
    }
}

fn round_offset(offset: f64) -> i64 {
    offset.round_ties_even() as i64
}

/// Every cell lies in the bounding box of the endpoints, so narrowing is exact.
fn cell(x: i64, y: i64) -> Coordinate {
    Coordinate::new(x as i32, y as i32)
}
