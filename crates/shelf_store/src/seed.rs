//! One-shot loader: JSON source document -> catalog store (destructive).

use super::{CatalogEntry, CatalogStore};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use shelfmate::catalog::BookId;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub ids: Vec<BookId>,
}

/// Parse a source document: a JSON array of book objects.
pub fn parse_source(data: &[u8]) -> Result<Vec<CatalogEntry>> {
    let entries: Vec<CatalogEntry> =
        serde_json::from_slice(data).context("source must be a JSON array of books")?;

    let mut seen = HashSet::with_capacity(entries.len());
    for e in &entries {
        if !seen.insert(e.book.id) {
            bail!("duplicate book id {} in source", e.book.id);
        }
    }
    Ok(entries)
}

pub async fn load_source<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let path = path.as_ref();
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("read source {}", path.display()))?;
    parse_source(&data)
}

/// Replace the whole store with the books in `source`.
pub async fn seed<P: AsRef<Path>>(source: P, store: &dyn CatalogStore) -> Result<SeedReport> {
    let entries = load_source(source).await?;
    let ids: Vec<BookId> = entries.iter().map(|e| e.book.id).collect();
    tracing::info!(books = entries.len(), "seeding catalog (full replace)");

    let inserted = store.replace_all(&entries).await?;
    Ok(SeedReport { inserted, ids })
}
