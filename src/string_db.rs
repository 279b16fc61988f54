//! String List Database
//!
//! TigerStyle: An ordered list of strings kept in one JSON file.
//!
//! Small general-purpose companion to the squirrel store. The file is
//! created empty on open when missing; an existing file is never touched
//! until the first save.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Ordered string list persisted to a file
#[derive(Debug, Clone)]
pub struct StringListDb {
    path: PathBuf,
}

impl StringListDb {
    /// Open the database, creating an empty file if none exists
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StringDbError> {
        let db = Self { path: path.into() };
        if !fs::try_exists(&db.path).await? {
            db.save_strings::<&str>(&[]).await?;
            tracing::debug!(path = %db.path.display(), "Created string list file");
        }
        Ok(db)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full list
    pub async fn load_strings(&self) -> Result<Vec<String>, StringDbError> {
        let bytes = fs::read(&self.path).await?;
        serde_json::from_slice(&bytes).map_err(StringDbError::InvalidFile)
    }

    /// Replace the full list
    pub async fn save_strings<S: AsRef<str>>(&self, items: &[S]) -> Result<(), StringDbError> {
        let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
        let bytes = serde_json::to_vec(&items)?;
        fs::write(&self.path, &bytes).await?;
        Ok(())
    }

    /// Append one item to the end of the list
    pub async fn save_string(&self, item: &str) -> Result<(), StringDbError> {
        let mut items = self.load_strings().await?;
        items.push(item.to_string());
        self.save_strings(&items).await
    }
}

// =============================================================================
// Errors
// =============================================================================

/// String list errors
#[derive(Debug, thiserror::Error)]
pub enum StringDbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid string list file: {0}")]
    InvalidFile(serde_json::Error),
}

// =============================================================================
// Tests
// =============================================================================
