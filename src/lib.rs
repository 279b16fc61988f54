//! squirreld - Squirrel Records over HTTP
//!
//! A small record-management API: CRUD over squirrels (name + size),
//! persisted to a single JSON file.
//!
//! Layers, leaves first:
//! - `persistence`: snapshot file format and atomic writes
//! - `squirrels`: the store (ID allocation, CRUD, stage/persist/commit)
//! - `routes`: the routing table (method + path → route, 404 or 501)
//! - `api`: axum dispatcher and status mapping
//! - `server`: listener and graceful shutdown
//!
//! `string_db` is an unrelated helper that persists a list of strings.

pub mod api;
pub mod config;
pub mod persistence;
pub mod routes;
pub mod server;
pub mod squirrels;
pub mod string_db;

pub use api::{router, ApiError, AppState};
pub use config::ServerConfig;
pub use persistence::{JsonFilePersistence, Persistence, PersistenceError, StoreSnapshot};
pub use squirrels::{
    new_shared_store, SharedSquirrelStore, Squirrel, SquirrelId, SquirrelInput, SquirrelStore,
    StoreError,
};
pub use string_db::{StringDbError, StringListDb};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Application name
pub const APP_NAME: &str = "squirreld";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
