use crate::catalog::{BookId, BookRecord, CatalogError, CatalogSnapshot};
use crate::index::DocumentMatrix;
use crate::query::{Reason, Recommendation};
use std::collections::HashSet;
use tracing::debug;

/// Ratings at or above this earn a quality reason.
pub const QUALITY_THRESHOLD: f64 = 4.6;

/// A catalog snapshot and the document matrix trained from it. Row `i` of the
/// matrix always describes `catalog.at(i)`.
pub struct TrainedState {
    generation: u64,
    catalog: CatalogSnapshot,
    matrix: DocumentMatrix,
}

impl TrainedState {
    /// Fails with [`CatalogError::EmptyVocabulary`] when no document yields a term.
    pub fn train(catalog: CatalogSnapshot, generation: u64) -> Result<Self, CatalogError> {
        let docs: Vec<String> = catalog.iter().map(|b| b.document()).collect();
        let matrix = DocumentMatrix::fit(&docs);
        if matrix.vocabulary().is_empty() {
            return Err(CatalogError::EmptyVocabulary);
        }
        Ok(Self {
            generation,
            catalog,
            matrix,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn matrix(&self) -> &DocumentMatrix {
        &self.matrix
    }

    /// Rank the catalog against the mean vector of the selected books.
    ///
    /// Unknown ids are ignored. Selected books, books with no similarity and books
    /// whose truncated percentage is 0 are never returned.
    pub fn recommend(&self, selected_ids: &[BookId], limit: usize) -> Vec<Recommendation> {
        let selected: HashSet<BookId> = selected_ids.iter().copied().collect();

        let mut rows: Vec<usize> = selected
            .iter()
            .filter_map(|&id| self.catalog.position(id))
            .collect();
        if rows.len() < selected.len() {
            debug!(
                unresolved = selected.len() - rows.len(),
                "ignoring unknown book ids"
            );
        }
        if rows.is_empty() || limit == 0 {
            return Vec::new();
        }
        // catalog order keeps the float sums independent of request order
        rows.sort_unstable();

        let profile = self.matrix.mean_of_rows(&rows);
        let sims = self.matrix.cosine_all(&profile);

        let mut ranked: Vec<usize> = (0..sims.len()).collect();
        // stable: equal scores keep catalog order
        ranked.sort_by(|&a, &b| sims[b].total_cmp(&sims[a]));

        let picked: Vec<&BookRecord> = rows
            .iter()
            .map(|&r| self.catalog.at(r).as_ref())
            .collect();
        let selection = Selection::new(&picked);

        let mut out = Vec::with_capacity(limit);
        for i in ranked {
            if out.len() >= limit {
                break;
            }
            let book = self.catalog.at(i);
            if selected.contains(&book.id) {
                continue;
            }
            let similarity = sims[i];
            let percent = (similarity * 100.0) as u8;
            if similarity <= 0.0 || percent == 0 {
                // descending order: nothing after this scores either
                break;
            }
            out.push(Recommendation {
                book: book.clone(),
                score: percent,
                reasons: selection.reasons(book, percent),
                similarity,
            });
        }
        out
    }
}

/// Authors and genre labels of the books the user picked.
struct Selection<'a> {
    authors: HashSet<&'a str>,
    genres: HashSet<&'a str>,
}

impl<'a> Selection<'a> {
    fn new(books: &[&'a BookRecord]) -> Self {
        let authors = books
            .iter()
            .map(|&b| b.author.as_str())
            .filter(|a| !a.is_empty())
            .collect();
        let genres = books.iter().flat_map(|&b| b.genre_labels()).collect();
        Self { authors, genres }
    }

    fn reasons(&self, book: &BookRecord, percent: u8) -> Vec<Reason> {
        let mut reasons = vec![Reason::SimilarPlot { percent }];
        if self.authors.contains(book.author.as_str()) {
            reasons.push(Reason::Author(book.author.clone()));
        }
        if let Some(g) = book.genre_labels().find(|g| self.genres.contains(g)) {
            reasons.push(Reason::Genre(g.to_string()));
        }
        if let Some(r) = book.rating.filter(|r| *r >= QUALITY_THRESHOLD) {
            reasons.push(Reason::Quality(r));
        }
        reasons
    }
}
