use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use shelf_store::fs::FsCatalogStore;
use shelf_store::CatalogStore;
use shelfd::config::ServiceConfig;
use shelfd::http_api::{router, AppState};
use shelfd::load_and_train;
use shelfmate::engine::Engine;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = ServiceConfig::from_env();
    let store: Arc<dyn CatalogStore> = Arc::new(FsCatalogStore::new(&cfg.catalog_path));
    let engine = Arc::new(Engine::new());

    // a missing or empty catalog is not fatal: serve and answer "not ready"
    match load_and_train(&engine, store.as_ref()).await {
        Ok(Ok(report)) => {
            tracing::info!(books = report.books, generation = report.generation, "engine ready")
        }
        Ok(Err(e)) => tracing::warn!(error = %e, "engine not ready"),
        Err(e) => tracing::error!(error = %e, catalog = %cfg.catalog_path, "catalog load failed"),
    }

    let addr: SocketAddr = cfg
        .addr
        .parse()
        .with_context(|| format!("bad SHELF_ADDR {:?}", cfg.addr))?;
    let app = router(AppState { engine, store, cfg });

    tracing::info!(address = %addr, "shelfd listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
