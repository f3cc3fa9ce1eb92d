//! Trained recommendation state and the process-wide handle around it.
//!
//! [`Engine`] owns at most one [`TrainedState`]. Training builds a complete new
//! state off to the side and swaps it in under a short write lock; queries clone
//! the current `Arc` under a read lock and rank against it without holding the
//! lock, so a query always sees a snapshot and matrix from the same generation.

pub mod rank;

use crate::catalog::{BookId, BookRecord, CatalogError, CatalogSnapshot};
use crate::query::Recommendation;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

pub use rank::{TrainedState, QUALITY_THRESHOLD};

#[derive(Clone, Default)]
pub enum Model {
    #[default]
    Untrained,
    Trained(Arc<TrainedState>),
}

impl Model {
    pub fn is_trained(&self) -> bool {
        matches!(self, Model::Trained(_))
    }

    pub fn recommend(&self, selected_ids: &[BookId], limit: usize) -> Vec<Recommendation> {
        match self {
            Model::Trained(st) => st.recommend(selected_ids, limit),
            Model::Untrained => {
                debug!("recommend on untrained engine");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrainReport {
    pub generation: u64,
    pub books: usize,
    pub vocabulary_size: usize,
    pub duplicates_dropped: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EngineStatus {
    pub trained: bool,
    pub books_loaded: usize,
    pub vocabulary_size: usize,
    pub generation: u64,
}

#[derive(Default)]
pub struct Engine {
    model: RwLock<Model>,
    // serialises trainers so generations are swapped in order
    train_lock: Mutex<()>,
    generation: AtomicU64,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current model handle; cheap to clone.
    pub fn model(&self) -> Model {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.model().is_trained()
    }

    /// Replace the trained state with one built from `records`.
    ///
    /// An empty catalog, or one without a single indexable term, leaves the
    /// engine untrained and returns the [`CatalogError`].
    pub fn train(&self, records: Vec<BookRecord>) -> Result<TrainReport, CatalogError> {
        let _guard = self
            .train_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let generation = self.generation.load(Ordering::Acquire) + 1;
        let state = match CatalogSnapshot::load(records)
            .and_then(|catalog| TrainedState::train(catalog, generation))
        {
            Ok(st) => st,
            Err(e) => {
                warn!(error = %e, "training skipped; engine is not ready");
                self.swap(Model::Untrained);
                return Err(e);
            }
        };
        let report = TrainReport {
            generation,
            books: state.catalog().len(),
            vocabulary_size: state.matrix().vocabulary().len(),
            duplicates_dropped: state.catalog().duplicates_dropped(),
        };
        self.swap(Model::Trained(Arc::new(state)));
        self.generation.store(generation, Ordering::Release);

        info!(
            books = report.books,
            vocabulary = report.vocabulary_size,
            generation,
            "model trained"
        );
        Ok(report)
    }

    pub fn recommend(&self, selected_ids: &[BookId], limit: usize) -> Vec<Recommendation> {
        self.model().recommend(selected_ids, limit)
    }

    pub fn status(&self) -> EngineStatus {
        match self.model() {
            Model::Trained(st) => EngineStatus {
                trained: true,
                books_loaded: st.catalog().len(),
                vocabulary_size: st.matrix().vocabulary().len(),
                generation: st.generation(),
            },
            Model::Untrained => EngineStatus {
                trained: false,
                books_loaded: 0,
                vocabulary_size: 0,
                generation: self.generation.load(Ordering::Acquire),
            },
        }
    }

    fn swap(&self, next: Model) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: BookId, synopsis: &str) -> BookRecord {
        BookRecord {
            id,
            title: String::new(),
            author: "someone".into(),
            genre: Some("Fiction".into()),
            synopsis: Some(synopsis.into()),
            rating: None,
        }
    }

    #[test]
    fn untrained_engine_answers_empty() {
        let e = Engine::new();
        assert!(!e.is_ready());
        assert!(e.recommend(&[1, 2], 3).is_empty());
        let st = e.status();
        assert!(!st.trained);
        assert_eq!(st.books_loaded, 0);
    }

    #[test]
    fn train_bumps_generation() {
        let e = Engine::new();
        let r1 = e.train(vec![book(1, "sea voyage"), book(2, "sea storm")]).unwrap();
        let r2 = e.train(vec![book(1, "sea voyage")]).unwrap();
        assert_eq!(r1.generation, 1);
        assert_eq!(r2.generation, 2);
        assert_eq!(e.status().books_loaded, 1);
        assert_eq!(e.status().generation, 2);
    }

    #[test]
    fn empty_retrain_makes_engine_not_ready() {
        let e = Engine::new();
        e.train(vec![book(1, "sea voyage"), book(2, "sea storm")]).unwrap();
        assert!(e.is_ready());

        assert_eq!(e.train(vec![]).unwrap_err(), CatalogError::EmptyCatalog);
        assert!(!e.is_ready());
        assert!(e.recommend(&[1], 3).is_empty());
    }

    #[test]
    fn termless_retrain_makes_engine_not_ready() {
        let e = Engine::new();
        e.train(vec![book(1, "sea voyage"), book(2, "sea storm")]).unwrap();

        let mut blank = book(3, "");
        blank.genre = None;
        assert_eq!(
            e.train(vec![blank]).unwrap_err(),
            CatalogError::EmptyVocabulary
        );
        let st = e.status();
        assert!(!st.trained);
        assert_eq!(st.vocabulary_size, 0);
        assert_eq!(st.generation, 1);
    }

    #[test]
    fn held_model_survives_retrain() {
        let e = Engine::new();
        e.train(vec![book(1, "sea voyage"), book(2, "sea storm")]).unwrap();
        let old = e.model();
        e.train(vec![book(7, "desert"), book(8, "desert heat")]).unwrap();

        // old handle still ranks its own generation
        assert_eq!(old.recommend(&[1], 3)[0].book.id, 2);
        assert_eq!(e.recommend(&[7], 3)[0].book.id, 8);
        assert!(e.recommend(&[1], 3).is_empty());
    }
}
