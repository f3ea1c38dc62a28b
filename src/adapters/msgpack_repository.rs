//! MessagePack implementation of the snapshot repository.
//!
//! This adapter implements the SnapshotRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Result, error::Error, ports::SnapshotRepository};

/// MessagePack-based snapshot repository.
///
/// Works for any serde-serializable snapshot; the agent Q-tables are large
/// and MessagePack keeps them compact on disk.
///
/// # Examples
///
/// ```no_run
/// use racetrack_rl::adapters::MsgPackRepository;
/// use racetrack_rl::monte_carlo::{MonteCarloAgent, SavedMonteCarloAgent};
/// use racetrack_rl::pipeline::TrainingMetadata;
/// use racetrack_rl::ports::SnapshotRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository::new();
/// let agent = MonteCarloAgent::default();
/// let snapshot = SavedMonteCarloAgent::new(&agent, TrainingMetadata::default());
///
/// repo.save(&snapshot, Path::new("racetrack.msgpack"))?;
/// let loaded: SavedMonteCarloAgent = repo.load(Path::new("racetrack.msgpack"))?;
/// # Ok::<(), racetrack_rl::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl<T> SnapshotRepository<T> for MsgPackRepository
where
    T: Serialize + DeserializeOwned,
{
    fn save(&self, snapshot: &T, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize snapshot to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<T> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {}", path.display()),
            source,
        })?;

        rmp_serde::decode::from_read(BufReader::new(file)).map_err(|e| {
            Error::SerializationContext {
                operation: "deserialize snapshot from MessagePack".to_string(),
                message: e.to_string(),
            }
        })
    }
}
