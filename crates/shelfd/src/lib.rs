pub mod config;
pub mod http_api;
pub mod types;

use shelf_store::CatalogStore;
use shelfmate::catalog::CatalogError;
use shelfmate::engine::{Engine, TrainReport};
use std::sync::Arc;

/// Fetch every book from `store` and retrain `engine` on the blocking pool.
///
/// The outer error is a store/runtime failure; the inner one means the store
/// was empty and the engine is now not ready.
pub async fn load_and_train(
    engine: &Arc<Engine>,
    store: &dyn CatalogStore,
) -> anyhow::Result<Result<TrainReport, CatalogError>> {
    let records = store.fetch_all().await?;
    let engine = engine.clone();
    let outcome = tokio::task::spawn_blocking(move || engine.train(records)).await?;
    Ok(outcome)
}
