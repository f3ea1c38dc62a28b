//! Property tests for the line rasterizer

use proptest::prelude::*;
use racetrack_rl::{Coordinate, rasterize};

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (-50i32..50, -50i32..50).prop_map(|(x, y)| Coordinate::new(x, y))
}

proptest! {
    #[test]
    fn path_contains_both_endpoints(a in coordinate(), b in coordinate()) {
        let path = rasterize(a, b);
        prop_assert!(path.contains(&a));
        prop_assert!(path.contains(&b));
    }

    #[test]
    fn path_ignores_argument_order(a in coordinate(), b in coordinate()) {
        prop_assert_eq!(rasterize(a, b), rasterize(b, a));
    }

    #[test]
    fn path_has_one_cell_per_primary_step(a in coordinate(), b in coordinate()) {
        let path = rasterize(a, b);
        let span = (b.x - a.x).abs().max((b.y - a.y).abs());
        prop_assert_eq!(path.len(), span as usize + 1);
    }

    #[test]
    fn consecutive_cells_are_king_neighbours(a in coordinate(), b in coordinate()) {
        let path = rasterize(a, b);
        for pair in path.windows(2) {
            prop_assert_eq!(pair[0].chebyshev_distance(pair[1]), 1);
        }
    }

    #[test]
    fn primary_coordinate_increases_by_one(a in coordinate(), b in coordinate()) {
        let path = rasterize(a, b);
        let x_major = (b.x - a.x).abs() >= (b.y - a.y).abs();
        for pair in path.windows(2) {
            let advance = if x_major {
                pair[1].x - pair[0].x
            } else {
                pair[1].y - pair[0].y
            };
            prop_assert_eq!(advance, 1);
        }
    }
}

#[test]
fn test_sample_picture_lines() {
    let c = Coordinate::new;
    assert_eq!(rasterize(c(0, 0), c(0, 20)).len(), 21);
    assert_eq!(rasterize(c(0, 0), c(20, 0)).len(), 21);
    assert_eq!(
        rasterize(c(3, 8), c(8, 1)),
        vec![
            c(8, 1),
            c(7, 2),
            c(7, 3),
            c(6, 4),
            c(5, 5),
            c(4, 6),
            c(4, 7),
            c(3, 8),
        ]
    );
}
