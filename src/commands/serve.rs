//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, LedgerStore, MemoryLedger, SeaLedger};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let app_state = if args.in_memory {
        tracing::warn!("Serving from memory; data is lost on shutdown");
        AppState::from_store(Arc::new(MemoryLedger::new()), config.clone())
    } else {
        let db = Database::connect(&config).await?;
        let store: Arc<dyn LedgerStore> = Arc::new(SeaLedger::new(db.get_connection()));
        AppState::from_store(store, config.clone()).with_database(db)
    };

    let cache = Cache::try_connect(config.redis_url.as_deref()).await;
    if cache.is_none() {
        tracing::info!("Rate limiting disabled");
    }
    let app = create_router(app_state.with_cache(cache));

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
