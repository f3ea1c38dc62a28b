//! Serialization support for the Monte Carlo race track agent.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    adapters::MsgPackRepository,
    error::Error,
    monte_carlo::agent::{MonteCarloAgent, MonteCarloState},
    pipeline::TrainingMetadata,
    ports::SnapshotRepository,
    racetrack::{TrackSpec, VelocityLimits},
};

/// Saved Monte Carlo agent together with the track it was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedMonteCarloAgent {
    pub version: u32,
    state: MonteCarloState,
    /// Layout the policy was learned on, if it came from a [`TrackSpec`]
    pub track: Option<TrackSpec>,
    pub limits: VelocityLimits,
    pub metadata: TrainingMetadata,
}

impl SavedMonteCarloAgent {
    pub const VERSION: u32 = 1;

    pub fn new(agent: &MonteCarloAgent, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            state: agent.export_state(),
            track: None,
            limits: VelocityLimits::default(),
            metadata,
        }
    }

    pub fn with_track(mut self, track: TrackSpec, limits: VelocityLimits) -> Self {
        self.track = Some(track);
        self.limits = limits;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSnapshotVersion`] for snapshots written by
    /// an incompatible format version.
    pub fn to_agent(&self) -> Result<MonteCarloAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(MonteCarloAgent::from_state(self.state.clone()))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        MsgPackRepository.save(self, path.as_ref())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        MsgPackRepository.load(path.as_ref())
    }
}
