//! Race track environment: the transition function over a track

use rand::rngs::StdRng;
use tracing::trace;

use super::{
    dynamics::{Acceleration, CarState, Outcome, StartSelector, UniformStart, Velocity, VelocityLimits},
    track::TrackGeometry,
};
use crate::{
    Result,
    error::Error,
    grid::Coordinate,
    ports::{Environment, Transition},
    raster::rasterize,
    render::{GridRenderer, Layer},
};

/// Reward for every move, including the one that crosses the finish.
pub const STEP_REWARD: f64 = -1.0;

/// Race track environment.
///
/// Holds only immutable data, so one value can serve any number of episodes
/// at once; each caller keeps its own [`CarState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceTrack {
    geometry: TrackGeometry,
    limits: VelocityLimits,
}

impl RaceTrack {
    pub fn new(geometry: TrackGeometry) -> Self {
        Self {
            geometry,
            limits: VelocityLimits::default(),
        }
    }

    pub fn classic() -> Result<Self> {
        Ok(Self::new(TrackGeometry::classic()?))
    }

    pub fn with_limits(mut self, limits: VelocityLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn limits(&self) -> VelocityLimits {
        self.limits
    }

    /// Accelerations allowed at `velocity`.
    pub fn legal_actions(&self, velocity: Velocity) -> Vec<Acceleration> {
        self.limits.legal_actions(velocity)
    }

    pub fn is_legal(&self, velocity: Velocity, action: Acceleration) -> bool {
        self.limits.admits(velocity + action)
    }

    /// A stationary car on a start cell picked by `selector`.
    pub fn start_state(&self, selector: &mut dyn StartSelector) -> Result<CarState> {
        selector
            .choose(self.geometry.start())
            .map(CarState::at_rest)
            .ok_or(Error::EmptyStartSet)
    }

    /// Cells swept when moving from `state` with its current velocity.
    pub fn swept_path(&self, state: &CarState) -> Vec<Coordinate> {
        rasterize(state.position, state.position + state.velocity)
    }

    /// Advance the car by one step.
    ///
    /// The car moves by its velocity *before* `action` is applied; the new
    /// velocity only takes effect on the following step. The whole swept path
    /// is checked: touching a boundary cell or ending outside the track resets
    /// the car, and only otherwise does crossing a finish cell end the episode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] if `action` is not legal for the
    /// current velocity, and [`Error::EmptyStartSet`] if a reset is needed
    /// but `selector` yields no start cell.
    pub fn step(
        &self,
        state: &CarState,
        action: Acceleration,
        selector: &mut dyn StartSelector,
    ) -> Result<Outcome> {
        if !self.is_legal(state.velocity, action) {
            return Err(Error::InvalidAction {
                velocity: state.velocity,
                action,
            });
        }

        let new_velocity = state.velocity + action;
        let new_position = state.position + state.velocity;
        let path = rasterize(state.position, new_position);

        let crashed = path.iter().any(|cell| self.geometry.bounds().contains(cell));
        if crashed || !self.geometry.in_range(new_position) {
            let restart = self.start_state(selector)?;
            trace!(from = %state, to = %new_position, restart = %restart.position, "car reset");
            return Ok(Outcome::Reset(restart));
        }

        if path.iter().any(|cell| self.geometry.finish().contains(cell)) {
            return Ok(Outcome::Terminated);
        }

        Ok(Outcome::Continuing(CarState::new(new_position, new_velocity)))
    }

    /// Track with the car `o` and its next swept path `+` drawn on top.
    pub fn render_state(&self, state: &CarState) -> String {
        let mut layers = self.geometry.layers();
        layers.push(Layer::new('+', self.swept_path(state)));
        layers.push(Layer::new('o', [state.position]));
        GridRenderer::new().render(
            Coordinate::new(1, 1),
            Coordinate::new(self.geometry.cols(), self.geometry.rows()),
            &layers,
        )
    }
}

impl Environment for RaceTrack {
    type State = CarState;
    type Action = Acceleration;

    fn name(&self) -> &str {
        "racetrack"
    }

    fn initial_state(&self, rng: &mut StdRng) -> Result<CarState> {
        self.start_state(&mut UniformStart(rng))
    }

    fn legal_actions(&self, state: &CarState) -> Vec<Acceleration> {
        self.limits.legal_actions(state.velocity)
    }

    fn step(
        &self,
        state: &CarState,
        action: Acceleration,
        rng: &mut StdRng,
    ) -> Result<Transition<CarState>> {
        let outcome = RaceTrack::step(self, state, action, &mut UniformStart(rng))?;
        Ok(match outcome.state() {
            Some(next) => Transition::continuing(next, STEP_REWARD),
            None => Transition::terminal(STEP_REWARD),
        })
    }

    fn render(&self, state: &CarState) -> Option<String> {
        Some(self.render_state(state))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::racetrack::FirstStart;

    fn c(x: i32, y: i32) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn open_track() -> RaceTrack {
        let geometry = TrackGeometry::builder(10, 10)
            .start_rect(c(1, 1), c(3, 1))
            .finish_rect(c(10, 10), c(10, 10))
            .build()
            .unwrap();
        RaceTrack::new(geometry)
    }

    fn accel(x: i32, y: i32) -> Acceleration {
        Acceleration::new(x, y).unwrap()
    }

    #[test]
    fn test_old_velocity_moves_the_car() {
        let track = open_track();
        let state = CarState::new(c(5, 5), Velocity::new(1, 0));
        let outcome = track.step(&state, accel(0, 1), &mut FirstStart).unwrap();
        assert_eq!(
            outcome,
            Outcome::Continuing(CarState::new(c(6, 5), Velocity::new(1, 1)))
        );
    }

    #[test]
    fn test_illegal_action_is_rejected() {
        let track = open_track();
        let state = CarState::at_rest(c(2, 1));
        let result = track.step(&state, accel(0, 0), &mut FirstStart);
        assert!(matches!(result, Err(Error::InvalidAction { .. })));

        let fast = CarState::new(c(2, 1), Velocity::new(4, 4));
        let result = track.step(&fast, accel(1, 0), &mut FirstStart);
        assert!(matches!(result, Err(Error::InvalidAction { .. })));
    }

    #[test]
    fn test_leaving_the_track_resets() {
        let track = open_track();
        let state = CarState::new(c(9, 5), Velocity::new(2, 0));
        let outcome = track.step(&state, accel(0, 0), &mut FirstStart).unwrap();
        assert_eq!(outcome, Outcome::Reset(CarState::at_rest(c(1, 1))));
    }

    #[test]
    fn test_environment_step_maps_outcomes() {
        let track = open_track();
        let mut rng = StdRng::seed_from_u64(1);
        let near_finish = CarState::new(c(9, 9), Velocity::new(1, 1));
        let transition =
            Environment::step(&track, &near_finish, accel(0, 0), &mut rng).unwrap();
        assert!(transition.is_terminal());
        assert_eq!(transition.reward, STEP_REWARD);

        let start = track.initial_state(&mut rng).unwrap();
        assert!(track.geometry().start().contains(&start.position));
        assert_eq!(start.velocity, Velocity::ZERO);
    }

    #[test]
    fn test_render_state_draws_car_over_path() {
        let geometry = TrackGeometry::builder(1, 4)
            .start_rect(c(1, 1), c(1, 1))
            .finish_rect(c(4, 1), c(4, 1))
            .build()
            .unwrap();
        let track = RaceTrack::new(geometry);
        let state = CarState::new(c(1, 1), Velocity::new(2, 0));
        assert_eq!(track.render_state(&state), "o + + | \n");
    }
}
