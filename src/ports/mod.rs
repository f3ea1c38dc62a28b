//! Ports (trait boundaries) between the learning core and its surroundings.
//!
//! Following hexagonal architecture, these traits are owned by the domain and
//! implemented by environments, agents and adapters.

pub mod environment;
pub mod learner;
pub mod observer;
pub mod repository;

pub use environment::{Environment, Transition};
pub use learner::{Learner, Step};
pub use observer::{EpisodeSummary, Observer};
pub use repository::SnapshotRepository;
