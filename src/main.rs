//! squirreld - Squirrel Records over HTTP
//!
//! Serves CRUD over squirrels on a fixed port, persisted to one JSON file.

use clap::Parser;
use squirreld::config::{
    ServerConfig, BIND_ADDRESS_DEFAULT, BIND_ADDRESS_ENV, DB_PATH_DEFAULT, DB_PATH_ENV,
};
use squirreld::{server, APP_NAME, APP_VERSION};

// =============================================================================
// CLI
// =============================================================================

/// Squirrel record service
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Squirrel CRUD over HTTP, persisted to a JSON file")]
#[command(version)]
struct Cli {
    /// HTTP bind address
    #[arg(short, long, env = BIND_ADDRESS_ENV, default_value = BIND_ADDRESS_DEFAULT)]
    bind: String,

    /// Data file holding the squirrel store
    #[arg(long, env = DB_PATH_ENV, default_value = DB_PATH_DEFAULT)]
    db: String,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads environment defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "info,tower_http=debug",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    tracing::info!("{} v{}", APP_NAME, APP_VERSION);

    let config = ServerConfig::new(&cli.bind, &cli.db)?;
    tracing::debug!(?config, "Resolved configuration");

    server::run(config).await
}
