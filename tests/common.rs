//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use racetrack_rl::{Coordinate, RaceTrack, TrackGeometry};

pub fn c(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y)
}

/// One-row track driving right from `(1, 1)` to a finish cell at `(len, 1)`.
pub fn corridor(len: i32) -> RaceTrack {
    let geometry = TrackGeometry::builder(1, len)
        .start_rect(c(1, 1), c(1, 1))
        .finish_rect(c(len, 1), c(len, 1))
        .build()
        .expect("corridor track is valid");
    RaceTrack::new(geometry)
}

/// 8 x 8 open square with the start along the bottom-left and the finish
/// along the top of the right column, walled off below the finish.
pub fn open_square() -> RaceTrack {
    let geometry = TrackGeometry::builder(8, 8)
        .bounds_rect(c(8, 1), c(8, 5))
        .finish_rect(c(8, 6), c(8, 8))
        .start_rect(c(1, 1), c(3, 1))
        .build()
        .expect("square track is valid");
    RaceTrack::new(geometry)
}
