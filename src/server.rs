//! HTTP Server
//!
//! TigerStyle: Open the store, bind, serve until Ctrl-C.

use crate::api;
use crate::config::ServerConfig;
use crate::persistence::JsonFilePersistence;
use crate::squirrels::{new_shared_store, SharedSquirrelStore, SquirrelStore};
use anyhow::Context;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Open the configured store and serve it until Ctrl-C
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!(path = %config.db_path.display(), "Opening data file");
    let persistence = Arc::new(JsonFilePersistence::new(&config.db_path));
    let store = SquirrelStore::open(persistence)
        .await
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    serve(listener, new_shared_store(store), shutdown_signal()).await
}

/// Serve the store on an already bound listener until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    store: SharedSquirrelStore,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, api::router(store))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        // Without a signal handler, keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
