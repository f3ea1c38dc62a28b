//! Windy gridworld
//!
//! A 10×7 grid with an upward wind blowing through the middle columns. The
//! agent starts at (1, 4) and must reach the goal at (8, 4); every move costs
//! -1 until the goal is reached. Three variants are provided:
//!
//! | Variant          | Moves                         | Wind                    |
//! |------------------|-------------------------------|-------------------------|
//! | `Standard`       | left, down, right, up         | steady                  |
//! | `KingMoves`      | + four diagonals and stay     | steady                  |
//! | `StochasticWind` | + four diagonals and stay     | random extra gust       |
//!
//! Wind is taken from the column the agent lands in after its own move.

use std::fmt;

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    grid::Coordinate,
    ports::{Environment, Transition},
    render::{GridRenderer, Layer},
};

/// A move on the grid, applied before wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub dx: i32,
    pub dy: i32,
}

impl Move {
    pub const LEFT: Move = Move::new(-1, 0);
    pub const DOWN: Move = Move::new(0, -1);
    pub const RIGHT: Move = Move::new(1, 0);
    pub const UP: Move = Move::new(0, 1);
    pub const DOWN_LEFT: Move = Move::new(-1, -1);
    pub const UP_LEFT: Move = Move::new(-1, 1);
    pub const DOWN_RIGHT: Move = Move::new(1, -1);
    pub const UP_RIGHT: Move = Move::new(1, 1);
    pub const STAY: Move = Move::new(0, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dx, self.dy)
    }
}

/// Which moves the agent may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveSet {
    Rook,
    King,
}

impl MoveSet {
    pub fn moves(self) -> Vec<Move> {
        let mut moves = vec![Move::LEFT, Move::DOWN, Move::RIGHT, Move::UP];
        if self == MoveSet::King {
            moves.extend([
                Move::DOWN_LEFT,
                Move::UP_LEFT,
                Move::DOWN_RIGHT,
                Move::UP_RIGHT,
                Move::STAY,
            ]);
        }
        moves
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindMode {
    /// +1 in columns 4, 5, 6 and 9, +2 in columns 7 and 8.
    Steady,
    /// Uniform in {0, 1, 2} resp. {1, 2, 3} in the same columns.
    Stochastic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindyVariant {
    #[default]
    Standard,
    KingMoves,
    StochasticWind,
}

impl WindyVariant {
    pub fn move_set(self) -> MoveSet {
        match self {
            WindyVariant::Standard => MoveSet::Rook,
            WindyVariant::KingMoves | WindyVariant::StochasticWind => MoveSet::King,
        }
    }

    pub fn wind_mode(self) -> WindMode {
        match self {
            WindyVariant::StochasticWind => WindMode::Stochastic,
            WindyVariant::Standard | WindyVariant::KingMoves => WindMode::Steady,
        }
    }
}

/// Windy gridworld dynamics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindyGridworld {
    width: i32,
    height: i32,
    start: Coordinate,
    goal: Coordinate,
    moves: Vec<Move>,
    wind: WindMode,
}

impl WindyGridworld {
    pub fn new(variant: WindyVariant) -> Self {
        Self {
            width: 10,
            height: 7,
            start: Coordinate::new(1, 4),
            goal: Coordinate::new(8, 4),
            moves: variant.move_set().moves(),
            wind: variant.wind_mode(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn start(&self) -> Coordinate {
        self.start
    }

    pub fn goal(&self) -> Coordinate {
        self.goal
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Upward push in `column`.
    pub fn wind_at(&self, column: i32, rng: &mut impl Rng) -> i32 {
        let (steady, gusts): (i32, [i32; 3]) = match column {
            4 | 5 | 6 | 9 => (1, [0, 1, 2]),
            7 | 8 => (2, [1, 2, 3]),
            _ => return 0,
        };
        match self.wind {
            WindMode::Steady => steady,
            WindMode::Stochastic => gusts[rng.random_range(0..gusts.len())],
        }
    }

    /// Reward and landing cell for `mv` from `position`.
    pub fn transition(&self, position: Coordinate, mv: Move, rng: &mut impl Rng) -> (f64, Coordinate) {
        let x = position.x + mv.dx;
        let y = position.y + mv.dy + self.wind_at(x, rng);
        let landed = Coordinate::new(x.clamp(1, self.width), y.clamp(1, self.height));
        if landed == self.goal {
            (0.0, landed)
        } else {
            (-1.0, landed)
        }
    }

    pub fn render_position(&self, position: Coordinate) -> String {
        GridRenderer::new().render(
            Coordinate::new(1, 1),
            Coordinate::new(self.width, self.height),
            &[Layer::new('o', [position]), Layer::new('+', [self.goal])],
        )
    }
}

impl Default for WindyGridworld {
    fn default() -> Self {
        Self::new(WindyVariant::default())
    }
}

impl Environment for WindyGridworld {
    type State = Coordinate;
    type Action = Move;

    fn name(&self) -> &str {
        "windy-gridworld"
    }

    fn initial_state(&self, _rng: &mut StdRng) -> Result<Coordinate> {
        Ok(self.start)
    }

    fn legal_actions(&self, _state: &Coordinate) -> Vec<Move> {
        self.moves.clone()
    }

    fn step(&self, state: &Coordinate, action: Move, rng: &mut StdRng) -> Result<Transition<Coordinate>> {
        if !self.moves.contains(&action) {
            return Err(Error::IllegalAction {
                environment: self.name().to_string(),
                action: action.to_string(),
            });
        }
        let (reward, next) = self.transition(*state, action, rng);
        Ok(if next == self.goal {
            Transition::terminal(reward)
        } else {
            Transition::continuing(next, reward)
        })
    }

    fn render(&self, state: &Coordinate) -> Option<String> {
        Some(self.render_position(*state))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_move_sets() {
        assert_eq!(MoveSet::Rook.moves().len(), 4);
        let king = MoveSet::King.moves();
        assert_eq!(king.len(), 9);
        assert!(king.contains(&Move::STAY));
    }

    #[test]
    fn test_steady_wind_pushes_after_move() {
        let world = WindyGridworld::new(WindyVariant::Standard);
        let mut rng = StdRng::seed_from_u64(0);
        // Moving right from column 3 lands in windy column 4
        let (reward, landed) = world.transition(Coordinate::new(3, 4), Move::RIGHT, &mut rng);
        assert_eq!(reward, -1.0);
        assert_eq!(landed, Coordinate::new(4, 5));
        // Moving left out of column 4 into calm column 3
        let (_, landed) = world.transition(Coordinate::new(4, 4), Move::LEFT, &mut rng);
        assert_eq!(landed, Coordinate::new(3, 4));
    }

    #[test]
    fn test_position_is_clamped() {
        let world = WindyGridworld::default();
        let mut rng = StdRng::seed_from_u64(0);
        let (_, landed) = world.transition(Coordinate::new(7, 7), Move::UP, &mut rng);
        assert_eq!(landed, Coordinate::new(7, 7));
        let (_, landed) = world.transition(Coordinate::new(1, 1), Move::LEFT, &mut rng);
        assert_eq!(landed, Coordinate::new(1, 1));
    }

    #[test]
    fn test_reaching_goal_terminates_with_zero_reward() {
        let world = WindyGridworld::default();
        let mut rng = StdRng::seed_from_u64(0);
        // Moving right into column 8 (wind +2) overshoots the goal row
        let transition = world.step(&Coordinate::new(7, 4), Move::RIGHT, &mut rng).unwrap();
        assert_eq!(transition.next_state, Some(Coordinate::new(8, 6)));
        // Moving down in column 8 still nets a row upwards
        let transition = world.step(&Coordinate::new(8, 3), Move::DOWN, &mut rng).unwrap();
        assert!(transition.is_terminal());
        assert_eq!(transition.reward, 0.0);
    }

    #[test]
    fn test_stochastic_wind_range() {
        let world = WindyGridworld::new(WindyVariant::StochasticWind);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert!((0..=2).contains(&world.wind_at(4, &mut rng)));
            assert!((1..=3).contains(&world.wind_at(8, &mut rng)));
        }
        assert_eq!(world.wind_at(1, &mut rng), 0);
    }

    #[test]
    fn test_rook_world_rejects_diagonals() {
        let world = WindyGridworld::default();
        let mut rng = StdRng::seed_from_u64(0);
        let result = world.step(&world.start(), Move::UP_RIGHT, &mut rng);
        assert!(matches!(result, Err(Error::IllegalAction { .. })));
    }
}
