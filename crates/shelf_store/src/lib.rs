use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelfmate::catalog::BookRecord;
use std::sync::{Arc, PoisonError, RwLock};

pub mod fs;
pub mod seed;

/// Full persisted shape of a book. Only `book` feeds the recommender; the rest
/// is carried for the catalog UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub book: BookRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Value>,
}

impl From<BookRecord> for CatalogEntry {
    fn from(book: BookRecord) -> Self {
        Self {
            book,
            year: None,
            pages: None,
            reviews_count: None,
            cover: None,
            isbn: None,
            tags: None,
        }
    }
}

/// Bulk access to the persisted catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<CatalogEntry>>;

    /// Drop everything and store `entries` instead. Returns the number stored.
    async fn replace_all(&self, entries: &[CatalogEntry]) -> Result<usize>;

    async fn fetch_all(&self) -> Result<Vec<BookRecord>> {
        Ok(self
            .fetch_entries()
            .await?
            .into_iter()
            .map(|e| e.book)
            .collect())
    }
}

/// Process-local store, handy for tests and demos.
#[derive(Clone, Default)]
pub struct MemoryCatalogStore {
    inner: Arc<RwLock<Vec<CatalogEntry>>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: Vec<BookRecord>) -> Self {
        let entries = books.into_iter().map(CatalogEntry::from).collect();
        Self {
            inner: Arc::new(RwLock::new(entries)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn fetch_entries(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn replace_all(&self, entries: &[CatalogEntry]) -> Result<usize> {
        let mut g = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *g = entries.to_vec();
        Ok(g.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_keeps_extra_fields() {
        let v = json!({
            "id": 7, "title": "Dune", "author": "Herbert", "genre": "Science Fiction",
            "synopsis": "spice", "rating": 5, "year": 1965, "pages": 412,
            "reviews_count": 1000, "cover": "https://example.org/dune.jpg",
            "isbn": "9780441013593", "tags": ["classic", "desert"]
        });
        let e: CatalogEntry = serde_json::from_value(v).unwrap();
        assert_eq!(e.book.id, 7);
        assert_eq!(e.book.rating, Some(5.0));
        assert_eq!(e.year, Some(1965));
        assert_eq!(e.tags, Some(json!(["classic", "desert"])));

        let back = serde_json::to_value(&e).unwrap();
        assert_eq!(back["isbn"], "9780441013593");
        assert_eq!(back["title"], "Dune");
    }

    #[test]
    fn entry_tolerates_null_title_and_author() {
        let e: CatalogEntry =
            serde_json::from_value(json!({"id": 3, "title": null, "author": null, "year": 2001}))
                .unwrap();
        assert_eq!(e.book.title, "");
        assert_eq!(e.book.author, "");
        assert_eq!(e.year, Some(2001));
    }

    #[tokio::test]
    async fn memory_store_replaces_wholesale() {
        let store = MemoryCatalogStore::new();
        assert!(store.is_empty());

        let a: CatalogEntry = serde_json::from_value(json!({"id": 1, "title": "A"})).unwrap();
        let b: CatalogEntry = serde_json::from_value(json!({"id": 2, "title": "B"})).unwrap();
        store.replace_all(&[a.clone(), b]).await.unwrap();
        assert_eq!(store.len(), 2);

        store.replace_all(&[a]).await.unwrap();
        let books = store.fetch_all().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "A");
    }
}
