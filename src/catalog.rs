use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub type BookId = i64;

/// One catalog entry as the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: BookId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    /// Comma separated genre labels, e.g. "Fantasy, Adventure"
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl BookRecord {
    pub fn genre_text(&self) -> &str {
        self.genre.as_deref().unwrap_or("")
    }

    pub fn synopsis_text(&self) -> &str {
        self.synopsis.as_deref().unwrap_or("")
    }

    /// Individual genre labels in the record's own order, trimmed, empties dropped.
    pub fn genre_labels(&self) -> impl Iterator<Item = &str> {
        self.genre_text()
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    /// Text the similarity index is trained on: genre, synopsis, title.
    pub fn document(&self) -> String {
        format!("{} {} {}", self.genre_text(), self.synopsis_text(), self.title)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog is empty; nothing to train on")]
    EmptyCatalog,
    #[error("catalog has no indexable terms; nothing to train on")]
    EmptyVocabulary,
}

/// Ordered, immutable view of the catalog plus id -> position lookup.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    books: Vec<Arc<BookRecord>>,
    by_id: HashMap<BookId, usize>,
    duplicates_dropped: usize,
}

impl CatalogSnapshot {
    /// Build a snapshot; the first record wins when an id repeats.
    pub fn load(records: Vec<BookRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut books = Vec::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());
        let mut duplicates_dropped = 0usize;

        for rec in records {
            if by_id.contains_key(&rec.id) {
                duplicates_dropped += 1;
                continue;
            }
            by_id.insert(rec.id, books.len());
            books.push(Arc::new(rec));
        }

        if duplicates_dropped > 0 {
            tracing::warn!(dropped = duplicates_dropped, "duplicate book ids in catalog load");
        }

        Ok(Self {
            books,
            by_id,
            duplicates_dropped,
        })
    }

    pub fn get(&self, id: BookId) -> Option<&Arc<BookRecord>> {
        self.by_id.get(&id).map(|&i| &self.books[i])
    }

    pub fn position(&self, id: BookId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn at(&self, pos: usize) -> &Arc<BookRecord> {
        &self.books[pos]
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BookRecord>> {
        self.books.iter()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }
}
