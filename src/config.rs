//! Server Configuration
//!
//! TigerStyle: Settings are resolved once at startup and never mutated.

use std::net::SocketAddr;
use std::path::PathBuf;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Default HTTP bind address
pub const BIND_ADDRESS_DEFAULT: &str = "127.0.0.1:8080";

/// Default data file
pub const DB_PATH_DEFAULT: &str = "squirrel_db.json";

/// Environment variable overriding the bind address
pub const BIND_ADDRESS_ENV: &str = "SQUIRREL_BIND";

/// Environment variable overriding the data file
pub const DB_PATH_ENV: &str = "SQUIRREL_DB";

// =============================================================================
// Types
// =============================================================================

/// Resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind: SocketAddr,
    /// JSON file holding the squirrel store
    pub db_path: PathBuf,
}

impl ServerConfig {
    /// Parse the bind address and expand `~` in the data file path
    pub fn new(bind: &str, db_path: &str) -> Result<Self, ConfigError> {
        let bind = bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind.to_string(),
                source,
            })?;

        if db_path.trim().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        let db_path = PathBuf::from(shellexpand::tilde(db_path).into_owned());

        Ok(Self { bind, db_path })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: PathBuf::from(DB_PATH_DEFAULT),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {source}")]
    InvalidBind {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("database path cannot be empty")]
    EmptyDbPath,
}

// =============================================================================
// Tests
// =============================================================================
