//! Squirrel Store
//!
//! TigerStyle: The store is the only owner of record identity and lifetime.
//!
//! State is an ordered list of records plus a monotonic ID counter. Every
//! mutation follows the same three steps:
//! 1. Stage the change on a copy of the state
//! 2. Persist the staged copy
//! 3. Commit the copy in memory
//!
//! A failed write therefore never leaves memory ahead of disk.

use crate::persistence::{Persistence, PersistenceError, StoreSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

// =============================================================================
// Types
// =============================================================================

/// Squirrel record ID
pub type SquirrelId = u64;

/// A stored squirrel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squirrel {
    /// Unique ID, immutable once assigned
    pub id: SquirrelId,
    /// Display name
    pub name: String,
    /// Free-form size label
    pub size: String,
}

/// Client-supplied fields for create and update.
///
/// Both fields are optional at the type level so that a missing field is a
/// validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SquirrelInput {
    pub name: Option<String>,
    pub size: Option<String>,
}

impl SquirrelInput {
    /// Input with both fields set
    pub fn new(name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            size: Some(size.into()),
        }
    }

    /// Check that both fields are present and non-empty
    pub fn validate(self) -> Result<(String, String), StoreError> {
        let name = self
            .name
            .filter(|v| !v.is_empty())
            .ok_or(StoreError::MissingField("name"))?;
        let size = self
            .size
            .filter(|v| !v.is_empty())
            .ok_or(StoreError::MissingField("size"))?;
        Ok((name, size))
    }
}

// =============================================================================
// Squirrel Store
// =============================================================================

/// Authoritative in-memory state, mirrored to a persistence backend
pub struct SquirrelStore {
    state: StoreSnapshot,
    persistence: Arc<dyn Persistence>,
}

impl std::fmt::Debug for SquirrelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SquirrelStore")
            .field("count", &self.state.squirrels.len())
            .field("next_id", &self.state.next_id)
            .finish()
    }
}

impl SquirrelStore {
    /// Load the store from its backend
    pub async fn open(persistence: Arc<dyn Persistence>) -> Result<Self, StoreError> {
        let mut state = persistence.load().await?;
        state.next_id = state.resume_id();
        state.squirrels.sort_by_key(|s| s.id);

        tracing::info!(
            count = state.squirrels.len(),
            next_id = state.next_id,
            "Opened squirrel store"
        );

        Ok(Self { state, persistence })
    }

    /// All live squirrels in ascending ID order
    pub fn list_all(&self) -> &[Squirrel] {
        &self.state.squirrels
    }

    /// Look up a squirrel by ID
    pub fn get(&self, id: SquirrelId) -> Option<&Squirrel> {
        self.position(id).map(|idx| &self.state.squirrels[idx])
    }

    /// Whether a squirrel with this ID exists
    pub fn contains(&self, id: SquirrelId) -> bool {
        self.position(id).is_some()
    }

    /// The ID the next successful create will receive
    pub fn next_id(&self) -> SquirrelId {
        self.state.next_id
    }

    /// Create a squirrel and return its new ID
    pub async fn create(&mut self, input: SquirrelInput) -> Result<SquirrelId, StoreError> {
        let (name, size) = input.validate()?;

        let id = self.state.next_id;
        let mut staged = self.state.clone();
        staged.next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        staged.squirrels.push(Squirrel { id, name, size });

        self.commit(staged).await?;
        tracing::info!(id = id, "Created squirrel");
        Ok(id)
    }

    /// Replace name and size of an existing squirrel
    pub async fn update(&mut self, id: SquirrelId, input: SquirrelInput) -> Result<(), StoreError> {
        let idx = self.position(id).ok_or(StoreError::NotFound(id))?;
        let (name, size) = input.validate()?;

        let mut staged = self.state.clone();
        let record = &mut staged.squirrels[idx];
        record.name = name;
        record.size = size;

        self.commit(staged).await?;
        tracing::info!(id = id, "Updated squirrel");
        Ok(())
    }

    /// Remove a squirrel; its ID is never handed out again
    pub async fn delete(&mut self, id: SquirrelId) -> Result<(), StoreError> {
        let idx = self.position(id).ok_or(StoreError::NotFound(id))?;

        let mut staged = self.state.clone();
        staged.squirrels.remove(idx);

        self.commit(staged).await?;
        tracing::info!(id = id, "Deleted squirrel");
        Ok(())
    }

    // Records are appended with increasing IDs, so the list stays sorted.
    fn position(&self, id: SquirrelId) -> Option<usize> {
        self.state
            .squirrels
            .binary_search_by_key(&id, |s| s.id)
            .ok()
    }

    async fn commit(&mut self, staged: StoreSnapshot) -> Result<(), StoreError> {
        if let Err(e) = self.persistence.save(&staged).await {
            tracing::error!(error = %e, "Persisting squirrel store failed, mutation discarded");
            return Err(e.into());
        }
        self.state = staged;
        Ok(())
    }
}

/// Thread-safe squirrel store
pub type SharedSquirrelStore = Arc<RwLock<SquirrelStore>>;

/// Wrap a store for sharing across request handlers
pub fn new_shared_store(store: SquirrelStore) -> SharedSquirrelStore {
    Arc::new(RwLock::new(store))
}

// =============================================================================
// Errors
// =============================================================================

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("squirrel not found: {0}")]
    NotFound(SquirrelId),

    #[error("squirrel ID space exhausted")]
    IdsExhausted,

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

// =============================================================================
// Tests
// =============================================================================
