//! Gym-style grid world with a target cell
//!
//! An agent and a target are placed on a `size × size` grid. The agent moves
//! one cell per step (up, right, down, left), clipped at the edges, receiving
//! -1 per step; the episode terminates when it reaches the target.
//!
//! Observations pack both locations into a single integer:
//! `(agent.x * size + agent.y) * size² + (target.x * size + target.y)`.
//!
//! Two views are provided: [`GridWorld`] implements the functional
//! [`Environment`] port used by the learners, and [`GridWorldEnv`] wraps it
//! with the familiar `reset` / `step` / `render` / `close` lifecycle that owns
//! its current state.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    grid::Coordinate,
    ports::{Environment, Transition},
    render::{GridRenderer, Layer},
};

/// Finite set `{0, 1, ..., n - 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrete {
    n: usize,
}

impl Discrete {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn contains(&self, value: usize) -> bool {
        value < self.n
    }

    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        rng.random_range(0..self.n)
    }
}

/// Action index to movement.
const DIRECTIONS: [Coordinate; 4] = [
    Coordinate::new(0, 1),
    Coordinate::new(1, 0),
    Coordinate::new(0, -1),
    Coordinate::new(-1, 0),
];

const STEP_REWARD: f64 = -1.0;

/// Grid world dynamics over packed observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWorld {
    size: usize,
}

impl GridWorld {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `size < 2` (the target must
    /// differ from the agent's cell).
    pub fn new(size: usize) -> Result<Self> {
        if size < 2 {
            return Err(Error::InvalidConfiguration {
                message: format!("grid world size must be at least 2, got {size}"),
            });
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn observation_space(&self) -> Discrete {
        Discrete::new(self.size.pow(4))
    }

    pub fn action_space(&self) -> Discrete {
        Discrete::new(DIRECTIONS.len())
    }

    pub fn encode(&self, agent: Coordinate, target: Coordinate) -> usize {
        self.cell_index(agent) * self.size * self.size + self.cell_index(target)
    }

    /// Agent and target locations packed in `observation`.
    pub fn decode(&self, observation: usize) -> Result<(Coordinate, Coordinate)> {
        let space = self.observation_space();
        if !space.contains(observation) {
            return Err(Error::InvalidObservation {
                observation,
                n: space.n(),
            });
        }
        let cells = self.size * self.size;
        Ok((
            self.cell_at(observation / cells),
            self.cell_at(observation % cells),
        ))
    }

    /// Random agent cell and a distinct random target cell.
    pub fn sample_locations(&self, rng: &mut impl Rng) -> (Coordinate, Coordinate) {
        let cells = self.size * self.size;
        let agent = rng.random_range(0..cells);
        let mut target = agent;
        while target == agent {
            target = rng.random_range(0..cells);
        }
        (self.cell_at(agent), self.cell_at(target))
    }

    /// Agent location after taking `action`, clipped to the grid.
    pub fn moved(&self, agent: Coordinate, action: usize) -> Result<Coordinate> {
        let direction = DIRECTIONS.get(action).ok_or(Error::InvalidGridAction {
            action,
            n: DIRECTIONS.len(),
        })?;
        let max = self.size as i32 - 1;
        Ok(Coordinate::new(
            (agent.x + direction.x).clamp(0, max),
            (agent.y + direction.y).clamp(0, max),
        ))
    }

    pub fn render_locations(&self, agent: Coordinate, target: Coordinate) -> String {
        let max = self.size as i32 - 1;
        GridRenderer::new().with_blank('.').render(
            Coordinate::new(0, 0),
            Coordinate::new(max, max),
            &[Layer::new('T', [target]), Layer::new('A', [agent])],
        )
    }

    fn cell_index(&self, cell: Coordinate) -> usize {
        cell.x as usize * self.size + cell.y as usize
    }

    fn cell_at(&self, index: usize) -> Coordinate {
        Coordinate::new((index / self.size) as i32, (index % self.size) as i32)
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        Self { size: 5 }
    }
}

impl Environment for GridWorld {
    type State = usize;
    type Action = usize;

    fn name(&self) -> &str {
        "gridworld"
    }

    fn initial_state(&self, rng: &mut StdRng) -> Result<usize> {
        let (agent, target) = self.sample_locations(rng);
        Ok(self.encode(agent, target))
    }

    fn legal_actions(&self, _state: &usize) -> Vec<usize> {
        (0..DIRECTIONS.len()).collect()
    }

    fn step(&self, state: &usize, action: usize, _rng: &mut StdRng) -> Result<Transition<usize>> {
        let (agent, target) = self.decode(*state)?;
        let agent = self.moved(agent, action)?;
        Ok(if agent == target {
            Transition::terminal(STEP_REWARD)
        } else {
            Transition::continuing(self.encode(agent, target), STEP_REWARD)
        })
    }

    fn render(&self, state: &usize) -> Option<String> {
        self.decode(*state)
            .ok()
            .map(|(agent, target)| self.render_locations(agent, target))
    }
}

/// How [`GridWorldEnv`] presents frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Print a frame to stdout after every reset and step.
    Human,
    /// Return frames from [`GridWorldEnv::render`].
    Ansi,
}

/// Auxiliary diagnostics returned with each observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Info {
    /// Manhattan distance between agent and target.
    pub distance: i32,
}

/// Result of [`GridWorldEnv::step`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: usize,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

/// Stateful wrapper with a reset/step lifecycle.
///
/// Episodes run until the agent reaches the target unless a step limit is
/// set with [`GridWorldEnv::with_max_episode_steps`], after which `step`
/// reports them as truncated.
#[derive(Debug)]
pub struct GridWorldEnv {
    world: GridWorld,
    render_mode: Option<RenderMode>,
    rng: StdRng,
    locations: Option<(Coordinate, Coordinate)>,
    max_episode_steps: Option<usize>,
    elapsed_steps: usize,
}

impl GridWorldEnv {
    pub fn new(world: GridWorld, render_mode: Option<RenderMode>) -> Self {
        Self {
            world,
            render_mode,
            rng: StdRng::from_rng(&mut rand::rng()),
            locations: None,
            max_episode_steps: None,
            elapsed_steps: 0,
        }
    }

    pub fn with_max_episode_steps(mut self, limit: usize) -> Self {
        self.max_episode_steps = Some(limit);
        self
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn observation_space(&self) -> Discrete {
        self.world.observation_space()
    }

    pub fn action_space(&self) -> Discrete {
        self.world.action_space()
    }

    /// Start a new episode. A `seed` reseeds the environment's generator.
    pub fn reset(&mut self, seed: Option<u64>) -> (usize, Info) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let (agent, target) = self.world.sample_locations(&mut self.rng);
        self.locations = Some((agent, target));
        self.elapsed_steps = 0;
        self.present_frame();
        (self.world.encode(agent, target), Self::info(agent, target))
    }

    /// # Errors
    ///
    /// Returns [`Error::EnvironmentNotReset`] before the first reset and
    /// [`Error::InvalidGridAction`] for actions outside the action space.
    pub fn step(&mut self, action: usize) -> Result<StepResult> {
        let (agent, target) = self.locations.ok_or(Error::EnvironmentNotReset)?;
        let agent = self.world.moved(agent, action)?;
        self.locations = Some((agent, target));
        self.elapsed_steps += 1;
        self.present_frame();
        let terminated = agent == target;
        let truncated = !terminated
            && self
                .max_episode_steps
                .is_some_and(|limit| self.elapsed_steps >= limit);
        Ok(StepResult {
            observation: self.world.encode(agent, target),
            reward: STEP_REWARD,
            terminated,
            truncated,
            info: Self::info(agent, target),
        })
    }

    /// Current frame in [`RenderMode::Ansi`]; `None` otherwise or before reset.
    pub fn render(&self) -> Option<String> {
        match self.render_mode {
            Some(RenderMode::Ansi) => self.frame(),
            _ => None,
        }
    }

    pub fn close(&mut self) {
        self.locations = None;
    }

    fn frame(&self) -> Option<String> {
        self.locations
            .map(|(agent, target)| self.world.render_locations(agent, target))
    }

    fn present_frame(&self) {
        if self.render_mode == Some(RenderMode::Human) {
            if let Some(frame) = self.frame() {
                println!("{frame}");
            }
        }
    }

    fn info(agent: Coordinate, target: Coordinate) -> Info {
        Info {
            distance: agent.manhattan_distance(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let world = GridWorld::default();
        let agent = Coordinate::new(1, 2);
        let target = Coordinate::new(4, 0);
        let observation = world.encode(agent, target);
        assert_eq!(observation, (5 + 2) * 25 + 20);
        assert_eq!(world.decode(observation).unwrap(), (agent, target));
        assert!(matches!(
            world.decode(625),
            Err(Error::InvalidObservation { .. })
        ));
    }

    #[test]
    fn test_spaces() {
        let world = GridWorld::default();
        assert_eq!(world.observation_space().n(), 625);
        assert_eq!(world.action_space().n(), 4);
        assert!(GridWorld::new(1).is_err());
    }

    #[test]
    fn test_moves_are_clipped() {
        let world = GridWorld::new(3).unwrap();
        let corner = Coordinate::new(2, 2);
        assert_eq!(world.moved(corner, 0).unwrap(), corner);
        assert_eq!(world.moved(corner, 1).unwrap(), corner);
        assert_eq!(world.moved(corner, 2).unwrap(), Coordinate::new(2, 1));
        assert_eq!(world.moved(corner, 3).unwrap(), Coordinate::new(1, 2));
        assert!(matches!(
            world.moved(corner, 4),
            Err(Error::InvalidGridAction { action: 4, n: 4 })
        ));
    }

    #[test]
    fn test_reset_separates_agent_and_target() {
        let mut env = GridWorldEnv::new(GridWorld::new(2).unwrap(), None);
        for seed in 0..20 {
            let (observation, info) = env.reset(Some(seed));
            let (agent, target) = env.world().decode(observation).unwrap();
            assert_ne!(agent, target);
            assert_eq!(info.distance, agent.manhattan_distance(target));
        }
    }

    #[test]
    fn test_step_before_reset_fails() {
        let mut env = GridWorldEnv::new(GridWorld::default(), None);
        assert!(matches!(env.step(0), Err(Error::EnvironmentNotReset)));
    }

    #[test]
    fn test_step_reaches_target() {
        let world = GridWorld::new(2).unwrap();
        let mut env = GridWorldEnv::new(world, Some(RenderMode::Ansi));
        let (observation, _) = env.reset(Some(7));
        let (agent, target) = world.decode(observation).unwrap();
        let action = (0..4)
            .find(|&a| world.moved(agent, a).unwrap() == target)
            .or_else(|| (0..4).find(|&a| world.moved(agent, a).unwrap() != agent))
            .unwrap();
        let result = env.step(action).unwrap();
        assert_eq!(result.reward, -1.0);
        assert!(!result.truncated);
        assert_eq!(result.terminated, world.moved(agent, action).unwrap() == target);
        assert!(env.render().is_some());
        env.close();
        assert!(env.render().is_none());
    }

    #[test]
    fn test_step_limit_truncates_until_reset() {
        let world = GridWorld::default();
        let mut env = GridWorldEnv::new(world, None).with_max_episode_steps(3);

        let step_away = |env: &mut GridWorldEnv| {
            let (agent, target) = env.locations.unwrap();
            let action = (0..4)
                .find(|&a| world.moved(agent, a).unwrap() != target)
                .unwrap();
            env.step(action).unwrap()
        };

        env.reset(Some(11));
        assert!(!step_away(&mut env).truncated);
        assert!(!step_away(&mut env).truncated);
        let last = step_away(&mut env);
        assert!(last.truncated);
        assert!(!last.terminated);

        env.reset(None);
        assert!(!step_away(&mut env).truncated);
    }

    #[test]
    fn test_render_frame() {
        let world = GridWorld::new(2).unwrap();
        let frame = world.render_locations(Coordinate::new(0, 0), Coordinate::new(1, 1));
        assert_eq!(frame, ". T \nA . \n");
    }
}
