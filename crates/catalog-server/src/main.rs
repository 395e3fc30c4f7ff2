//! Catalog Server
//!
//! Serves product reads and writes from a Postgres primary/replica pair with
//! a best-effort cache in front.

use anyhow::{Context, Result};
use catalog_core::{CacheBackend, CacheFacade, ProductRepository, StoreRole};
use catalog_server::config::Settings;
use catalog_server::storage::{MemoryCache, PgConnector, RedisCache};
use catalog_server::{router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    info!("Loading configuration...");
    let settings = Settings::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, cache={}",
        settings.bind_address,
        if settings.cache.uses_redis() {
            "redis"
        } else {
            "memory"
        }
    );

    // Store connectors
    let primary = Arc::new(PgConnector::connect_lazy(
        StoreRole::Primary,
        &settings.primary,
    )?);
    let replica = Arc::new(PgConnector::connect_lazy(
        StoreRole::Replica,
        &settings.replica,
    )?);

    if settings.run_migrations {
        info!("Running migrations on primary...");
        primary.run_migrations().await?;
    }

    // Cache
    let backend: Arc<dyn CacheBackend> = if settings.cache.uses_redis() {
        Arc::new(RedisCache::new(&settings.cache.url).context("Invalid cache URL")?)
    } else {
        Arc::new(MemoryCache::new())
    };
    let cache =
        Arc::new(CacheFacade::connect(backend, settings.cache.reconnect_policy()).await);

    let products = Arc::new(
        ProductRepository::new(cache.clone(), primary, replica).with_ttl(settings.cache.ttl()),
    );

    let app = router(AppState { products, cache });

    let addr: SocketAddr = settings
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
