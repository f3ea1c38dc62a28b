//! Repository port for agent snapshot persistence.

use std::path::Path;

use crate::Result;

/// Port for persisting and loading snapshots of type `T`.
///
/// This trait abstracts the storage mechanism, allowing different
/// implementations (MessagePack files, memory) without coupling the agents to
/// a specific serialization format.
///
/// # Examples
///
/// ```no_run
/// use racetrack_rl::ports::SnapshotRepository;
/// use racetrack_rl::monte_carlo::SavedMonteCarloAgent;
/// use std::path::Path;
///
/// fn save_agent<R: SnapshotRepository<SavedMonteCarloAgent>>(
///     repo: &R,
///     snapshot: &SavedMonteCarloAgent,
///     path: &Path,
/// ) -> racetrack_rl::Result<()> {
///     repo.save(snapshot, path)
/// }
/// ```
pub trait SnapshotRepository<T> {
    /// Save a snapshot to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be created or written to
    /// - Serialization fails
    fn save(&self, snapshot: &T, path: &Path) -> Result<()>;

    /// Load a snapshot from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Nothing is stored at `path`
    /// - The stored bytes cannot be deserialized
    fn load(&self, path: &Path) -> Result<T>;
}
