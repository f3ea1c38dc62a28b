//! In-memory snapshot repository for testing.
//!
//! Snapshots are encoded with MessagePack exactly as on disk, so a value that
//! survives this repository also survives [`super::MsgPackRepository`].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Result, error::Error, ports::SnapshotRepository};

/// In-memory repository for testing.
///
/// # Thread Safety
///
/// This repository can be cloned and shared across threads. All clones share
/// the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(path)
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> SnapshotRepository<T> for InMemoryRepository
where
    T: Serialize + DeserializeOwned,
{
    fn save(&self, snapshot: &T, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec(snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize snapshot for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(path.to_path_buf(), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<T> {
        let storage = self.storage();
        let bytes = storage.get(path).ok_or_else(|| Error::SnapshotNotFound {
            path: path.display().to_string(),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize snapshot from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let path = Path::new("policy");

        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&vec![(1, -2.5), (2, -7.0)], path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));

        let loaded: Vec<(i32, f64)> = repo.load(path).unwrap();
        assert_eq!(loaded, vec![(1, -2.5), (2, -7.0)]);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = InMemoryRepository::new();
        let result: Result<Vec<u8>> = repo.load(Path::new("nonexistent"));
        assert!(matches!(result, Err(Error::SnapshotNotFound { .. })));
    }

    #[test]
    fn test_clear_removes_all() {
        let repo = InMemoryRepository::new();
        repo.save(&1u8, Path::new("a")).unwrap();
        repo.save(&2u8, Path::new("b")).unwrap();
        assert_eq!(repo.count(), 2);

        repo.clear();
        assert_eq!(repo.count(), 0);
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();

        repo1.save(&"shared".to_string(), Path::new("shared")).unwrap();
        let loaded: String = repo2.load(Path::new("shared")).unwrap();

        assert_eq!(loaded, "shared");
        assert_eq!(repo2.count(), 1);
    }
}
