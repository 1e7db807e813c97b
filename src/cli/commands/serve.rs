use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use tracing::{info, warn};

use crate::auth::build_verifier;
use crate::config::{self, AppConfig, AuthMode};
use crate::database::{CareStore, DatabaseManager, MemoryStore, PgStore};
use crate::routes;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT / PETCARE_API_PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = config::config()?.clone();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    info!("Starting Pet Care API in {:?} mode", config.environment);

    let store = build_store(&config).await?;
    let verifier = build_verifier(&config.auth);
    let port = config.api.port;
    let state = AppState::new(store, verifier, config);
    info!(
        ttl_secs = state.reflection_cache.ttl().as_secs(),
        "reflection note list cache ready"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Pet Care API listening on http://{}", addr);

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Postgres when a URL is configured; otherwise the in-memory store, which is
/// only allowed together with the stub verifier.
async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CareStore>> {
    if config.database.url.is_some() {
        let pool = DatabaseManager::connect(&config.database).await?;
        let store = PgStore::new(pool);
        if config.database.run_migrations {
            DatabaseManager::migrate(store.pool()).await?;
        }
        return Ok(Arc::new(store));
    }

    match &config.auth.mode {
        AuthMode::Stub { subject } => {
            warn!("DATABASE_URL not set: using in-memory store, data is lost on restart");
            let store = MemoryStore::new();
            let user = store.insert_user(subject).await;
            info!(user_id = user.id, subject = %subject, "seeded stub user");
            Ok(Arc::new(store))
        }
        AuthMode::Firebase { .. } => bail!("DATABASE_URL must be set when Firebase authentication is enabled"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
