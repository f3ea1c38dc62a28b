//! Racetrack environment
//!
//! A car drives across a grid track. Each step it picks an acceleration in
//! {-1, 0, 1}², moves by the velocity it had *before* accelerating, and the
//! cells swept by that move are checked against the track:
//!
//! 1. touching an out-of-bounds cell, or ending outside the track, puts the
//!    car back on a start cell at rest;
//! 2. otherwise, crossing a finish cell ends the episode;
//! 3. otherwise the car continues with its new position and velocity.
//!
//! ```
//! use racetrack_rl::racetrack::{Acceleration, CarState, FirstStart, Outcome, RaceTrack, Velocity};
//! use racetrack_rl::Coordinate;
//!
//! let track = RaceTrack::classic()?;
//! let state = CarState::new(Coordinate::new(5, 5), Velocity::new(1, 0));
//! let outcome = track.step(&state, Acceleration::new(0, 1)?, &mut FirstStart)?;
//! assert_eq!(
//!     outcome,
//!     Outcome::Continuing(CarState::new(Coordinate::new(6, 5), Velocity::new(1, 1)))
//! );
//! # Ok::<(), racetrack_rl::Error>(())
//! ```

pub mod dynamics;
pub mod env;
pub mod track;

pub use dynamics::{
    Acceleration, CarState, FirstStart, Outcome, StartSelector, UniformStart, Velocity,
    VelocityLimits,
};
pub use env::{RaceTrack, STEP_REWARD};
pub use track::{Rect, TrackBuilder, TrackGeometry, TrackSpec, rectangle_cells};
