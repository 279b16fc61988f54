//! Store Persistence
//!
//! TigerStyle: The whole collection is one JSON document on disk.
//!
//! Every mutation rewrites the full snapshot. Writes land in a sibling
//! temporary file first and are then renamed over the target, so readers
//! only ever see the previous or the next complete snapshot.
//!
//! File layout:
//! ```json
//! { "version": 1, "next_id": 3, "squirrels": [ {"id": 1, "name": "Fluffy", "size": "large"} ] }
//! ```

use crate::squirrels::Squirrel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// First ID handed out by an empty store
pub const SQUIRREL_ID_FIRST: u64 = 1;

/// Suffix of the scratch file used for atomic replacement
const TEMP_FILE_SUFFIX: &str = "tmp";

// =============================================================================
// Types
// =============================================================================

/// Serialized form of the full store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Format version
    #[serde(default = "snapshot_version_default")]
    pub version: u32,
    /// Next ID to hand out
    #[serde(default = "next_id_default")]
    pub next_id: u64,
    /// Live records in creation order
    #[serde(default)]
    pub squirrels: Vec<Squirrel>,
}

fn snapshot_version_default() -> u32 {
    SNAPSHOT_VERSION
}

fn next_id_default() -> u64 {
    SQUIRREL_ID_FIRST
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            next_id: SQUIRREL_ID_FIRST,
            squirrels: Vec::new(),
        }
    }
}

impl StoreSnapshot {
    /// The counter to resume from.
    ///
    /// Never below `max(id) + 1`, so a file with a stale or missing counter
    /// still cannot cause ID reuse.
    pub fn resume_id(&self) -> u64 {
        let after_max = self
            .squirrels
            .iter()
            .map(|s| s.id.saturating_add(1))
            .max()
            .unwrap_or(SQUIRREL_ID_FIRST);
        self.next_id.max(after_max).max(SQUIRREL_ID_FIRST)
    }
}

// =============================================================================
// Backend Trait
// =============================================================================

/// Durable home for store snapshots
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Load the last saved snapshot, initializing storage if it is empty
    async fn load(&self) -> Result<StoreSnapshot, PersistenceError>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError>;
}

// =============================================================================
// JSON File Backend
// =============================================================================

/// Snapshot stored as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Create a backend for the given file (nothing is touched until `load`)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(TEMP_FILE_SUFFIX);
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Persistence for JsonFilePersistence {
    async fn load(&self) -> Result<StoreSnapshot, PersistenceError> {
        if !fs::try_exists(&self.path).await? {
            let snapshot = StoreSnapshot::default();
            self.save(&snapshot).await?;
            tracing::info!(path = %self.path.display(), "Created empty data file");
            return Ok(snapshot);
        }

        let bytes = fs::read(&self.path).await?;
        let snapshot: StoreSnapshot =
            serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: snapshot.version,
                max: SNAPSHOT_VERSION,
            });
        }

        tracing::debug!(
            path = %self.path.display(),
            count = snapshot.squirrels.len(),
            next_id = snapshot.next_id,
            "Loaded data file"
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, &bytes).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt data file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported data file version: {found} > {max}")]
    UnsupportedVersion { found: u32, max: u32 },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn squirrel(id: u64, name: &str, size: &str) -> Squirrel {
        Squirrel {
            id,
            name: name.to_string(),
            size: size.to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("squirrel_db.json");
        assert!(!path.exists());

        let backend = JsonFilePersistence::new(&path);
        let snapshot = backend.load().await.unwrap();

        assert!(path.exists());
        assert_eq!(snapshot, StoreSnapshot::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let backend = JsonFilePersistence::new(dir.path().join("db.json"));

        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            next_id: 4,
            squirrels: vec![squirrel(1, "Fluffy", "large"), squirrel(3, "Nibbles", "small")],
        };
        backend.save(&snapshot).await.unwrap();

        let reopened = JsonFilePersistence::new(backend.path());
        assert_eq!(reopened.load().await.unwrap(), snapshot);
        assert!(!backend.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("db.json");
        let backend = JsonFilePersistence::new(&path);

        backend.save(&StoreSnapshot::default()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, b"not json at all").unwrap();

        let err = JsonFilePersistence::new(&path).load().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { .. }));
        // Existing contents are left alone
        assert_eq!(std::fs::read(&path).unwrap(), b"not json at all");
    }

    #[tokio::test]
    async fn test_load_rejects_future_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, br#"{"version": 99, "next_id": 1, "squirrels": []}"#).unwrap();

        let err = JsonFilePersistence::new(&path).load().await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_resume_id_never_reuses() {
        // Counter missing from the file: recovered from the highest ID
        let snapshot: StoreSnapshot = serde_json::from_str(
            r#"{"squirrels": [{"id": 2, "name": "a", "size": "b"}, {"id": 7, "name": "c", "size": "d"}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.resume_id(), 8);

        // Counter ahead of surviving records (highest ID was deleted)
        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            next_id: 10,
            squirrels: vec![squirrel(2, "a", "b")],
        };
        assert_eq!(snapshot.resume_id(), 10);

        assert_eq!(StoreSnapshot::default().resume_id(), SQUIRREL_ID_FIRST);
    }
}
