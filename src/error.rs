//! Error types for the racetrack crate

use thiserror::Error;

use crate::racetrack::{Acceleration, Velocity};

/// Main error type for the racetrack crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("action {action} is not legal for velocity {velocity}")]
    InvalidAction {
        velocity: Velocity,
        action: Acceleration,
    },

    #[error("acceleration components must be in -1..=1, got ({x}, {y})")]
    InvalidAcceleration { x: i32, y: i32 },

    #[error("invalid track: {message}")]
    InvalidTrack { message: String },

    #[error("track has no start cells to reset onto")]
    EmptyStartSet,

    #[error("no legal actions available in state {state}")]
    NoLegalActions { state: String },

    #[error("action {action} is not available in environment '{environment}'")]
    IllegalAction { environment: String, action: String },

    #[error("action {action} is outside the action space (n = {n})")]
    InvalidGridAction { action: usize, n: usize },

    #[error("observation {observation} is outside the observation space (n = {n})")]
    InvalidObservation { observation: usize, n: usize },

    #[error("environment must be reset before calling step")]
    EnvironmentNotReset,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },

    #[error("no snapshot stored at '{path}'")]
    SnapshotNotFound { path: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
