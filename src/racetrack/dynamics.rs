//! Kinematic state, accelerations and velocity limits of the race car

use std::{collections::BTreeSet, fmt, ops::Add};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Result, error::Error, grid::Coordinate};

/// Displacement per step. Same shape as a [`Coordinate`] but not a location.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Velocity {
    pub x: i32,
    pub y: i32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add<Velocity> for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Velocity) -> Coordinate {
        Coordinate::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Change of velocity chosen by the driver, each component in `-1..=1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Acceleration {
    x: i32,
    y: i32,
}

impl Acceleration {
    /// Every acceleration, in lexicographic order.
    pub const ALL: [Acceleration; 9] = [
        Acceleration { x: -1, y: -1 },
        Acceleration { x: -1, y: 0 },
        Acceleration { x: -1, y: 1 },
        Acceleration { x: 0, y: -1 },
        Acceleration { x: 0, y: 0 },
        Acceleration { x: 0, y: 1 },
        Acceleration { x: 1, y: -1 },
        Acceleration { x: 1, y: 0 },
        Acceleration { x: 1, y: 1 },
    ];

    /// # Errors
    ///
    /// Returns [`Error::InvalidAcceleration`] if a component is outside `-1..=1`.
    pub fn new(x: i32, y: i32) -> Result<Self> {
        if (-1..=1).contains(&x) && (-1..=1).contains(&y) {
            Ok(Self { x, y })
        } else {
            Err(Error::InvalidAcceleration { x, y })
        }
    }

    pub fn x(self) -> i32 {
        self.x
    }

    pub fn y(self) -> i32 {
        self.y
    }
}

impl fmt::Display for Acceleration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add<Acceleration> for Velocity {
    type Output = Velocity;

    fn add(self, rhs: Acceleration) -> Velocity {
        Velocity::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Position and velocity of the car. Nothing else is tracked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CarState {
    pub position: Coordinate,
    pub velocity: Velocity,
}

impl CarState {
    pub const fn new(position: Coordinate, velocity: Velocity) -> Self {
        Self { position, velocity }
    }

    /// Stationary car at `position`.
    pub const fn at_rest(position: Coordinate) -> Self {
        Self::new(position, Velocity::ZERO)
    }
}

impl fmt::Display for CarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos {} vel {}", self.position, self.velocity)
    }
}

/// Inclusive ranges allowed for each velocity component.
///
/// Two presets exist: [`VelocityLimits::bidirectional`] (the default) lets the
/// car drift left as well as right, [`VelocityLimits::forward_only`] keeps both
/// components non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityLimits {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl VelocityLimits {
    /// Horizontal velocity in `-4..=4`, vertical in `0..=4`.
    pub const fn bidirectional() -> Self {
        Self {
            min_x: -4,
            max_x: 4,
            min_y: 0,
            max_y: 4,
        }
    }

    /// Both components in `0..=4`.
    pub const fn forward_only() -> Self {
        Self {
            min_x: 0,
            max_x: 4,
            min_y: 0,
            max_y: 4,
        }
    }

    /// Whether `velocity` is within range and not standing still.
    pub fn admits(&self, velocity: Velocity) -> bool {
        (self.min_x..=self.max_x).contains(&velocity.x)
            && (self.min_y..=self.max_y).contains(&velocity.y)
            && !velocity.is_zero()
    }

    /// Accelerations that keep `velocity` admissible, in [`Acceleration::ALL`] order.
    pub fn legal_actions(&self, velocity: Velocity) -> Vec<Acceleration> {
        Acceleration::ALL
            .into_iter()
            .filter(|action| self.admits(velocity + *action))
            .collect()
    }

    /// Every velocity within range, including zero.
    pub fn velocities(&self) -> impl Iterator<Item = Velocity> + '_ {
        (self.min_x..=self.max_x)
            .flat_map(move |x| (self.min_y..=self.max_y).map(move |y| Velocity::new(x, y)))
    }
}

impl Default for VelocityLimits {
    fn default() -> Self {
        Self::bidirectional()
    }
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The car moved without touching bounds or finish.
    Continuing(CarState),
    /// The swept path hit a boundary or left the track; the car restarts at rest.
    Reset(CarState),
    /// The swept path crossed the finish line.
    Terminated,
}

impl Outcome {
    /// State the episode continues from, if it continues.
    pub fn state(&self) -> Option<CarState> {
        match self {
            Outcome::Continuing(state) | Outcome::Reset(state) => Some(*state),
            Outcome::Terminated => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Terminated)
    }
}

/// Picks the cell a crashed car restarts from.
///
/// Implementations must return a member of `starts`, or `None` only when
/// `starts` is empty.
pub trait StartSelector {
    fn choose(&mut self, starts: &BTreeSet<Coordinate>) -> Option<Coordinate>;
}

/// Uniform choice among start cells, drawing from a borrowed RNG.
pub struct UniformStart<'a, R: Rng + ?Sized>(pub &'a mut R);

impl<R: Rng + ?Sized> StartSelector for UniformStart<'_, R> {
    fn choose(&mut self, starts: &BTreeSet<Coordinate>) -> Option<Coordinate> {
        if starts.is_empty() {
            return None;
        }
        let index = self.0.random_range(0..starts.len());
        starts.iter().nth(index).copied()
    }
}

/// Always the smallest start cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstStart;

impl StartSelector for FirstStart {
    fn choose(&mut self, starts: &BTreeSet<Coordinate>) -> Option<Coordinate> {
        starts.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_acceleration_range_is_validated() {
        assert!(Acceleration::new(1, -1).is_ok());
        assert!(matches!(
            Acceleration::new(2, 0),
            Err(Error::InvalidAcceleration { x: 2, y: 0 })
        ));
    }

    #[test]
    fn test_zero_velocity_never_keeps_still() {
        let actions = VelocityLimits::bidirectional().legal_actions(Velocity::ZERO);
        assert!(!actions.contains(&Acceleration::new(0, 0).unwrap()));
        // y may not go negative, so only the five with y >= 0 minus the null one
        assert_eq!(actions.len(), 5);
    }

    #[test]
    fn test_forward_only_limits() {
        let limits = VelocityLimits::forward_only();
        let actions = limits.legal_actions(Velocity::ZERO);
        assert_eq!(
            actions,
            vec![
                Acceleration::new(0, 1).unwrap(),
                Acceleration::new(1, 0).unwrap(),
                Acceleration::new(1, 1).unwrap(),
            ]
        );
        assert!(!limits.admits(Velocity::new(-1, 2)));
        assert!(VelocityLimits::bidirectional().admits(Velocity::new(-1, 2)));
    }

    #[test]
    fn test_top_speed_is_capped() {
        let actions = VelocityLimits::bidirectional().legal_actions(Velocity::new(4, 4));
        assert!(actions.iter().all(|a| a.x() <= 0 && a.y() <= 0));
        assert_eq!(actions.len(), 4);
    }

    #[test]
    fn test_uniform_start_stays_in_set() {
        let starts: BTreeSet<_> = (1..=4).map(|x| Coordinate::new(x, 1)).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let mut selector = UniformStart(&mut rng);
        for _ in 0..50 {
            let chosen = selector.choose(&starts).unwrap();
            assert!(starts.contains(&chosen));
        }
        assert_eq!(UniformStart(&mut rng).choose(&BTreeSet::new()), None);
    }

    #[test]
    fn test_first_start_is_smallest() {
        let starts: BTreeSet<_> = [Coordinate::new(5, 1), Coordinate::new(4, 1)].into();
        assert_eq!(FirstStart.choose(&starts), Some(Coordinate::new(4, 1)));
    }
}
