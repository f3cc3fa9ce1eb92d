pub mod normalizer;
pub mod vocab;

use normalizer::tokenize;
use rayon::prelude::*;
use std::collections::BTreeMap;
use vocab::{TermId, Vocabulary};

/// One L2-normalised TF-IDF row, entries sorted by term id.
#[derive(Debug, Clone, Default)]
pub struct SparseRow {
    entries: Vec<(TermId, f64)>,
}

impl SparseRow {
    pub fn entries(&self) -> &[(TermId, f64)] {
        &self.entries
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.entries.iter().map(|&(t, w)| w * dense[t as usize]).sum()
    }
}

pub struct DocumentMatrix {
    vocab: Vocabulary,
    rows: Vec<SparseRow>,
}

impl DocumentMatrix {
    /// tf * idf over raw term counts, rows L2-normalised. No stop-word filtering.
    pub fn fit<S: AsRef<str> + Sync>(documents: &[S]) -> Self {
        let doc_terms: Vec<BTreeMap<String, u32>> = documents
            .par_iter()
            .map(|d| {
                let mut counts = BTreeMap::new();
                for tok in tokenize(d.as_ref()) {
                    *counts.entry(tok).or_insert(0u32) += 1;
                }
                counts
            })
            .collect();

        let vocab = Vocabulary::build(&doc_terms);

        let rows = doc_terms
            .iter()
            .map(|counts| {
                let mut entries: Vec<(TermId, f64)> = counts
                    .iter()
                    .filter_map(|(term, &tf)| {
                        let id = vocab.id(term)?;
                        Some((id, tf as f64 * vocab.idf(id)))
                    })
                    .collect();
                entries.sort_by_key(|&(id, _)| id);

                let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in entries.iter_mut() {
                        *w /= norm;
                    }
                }
                SparseRow { entries }
            })
            .collect();

        Self { vocab, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn row(&self, i: usize) -> &SparseRow {
        &self.rows[i]
    }

    /// Dense element-wise mean of the given rows. Summation follows `rows` order.
    pub fn mean_of_rows(&self, rows: &[usize]) -> Vec<f64> {
        let mut acc = vec![0.0; self.vocab.len()];
        if rows.is_empty() {
            return acc;
        }
        for &r in rows {
            for &(t, w) in self.rows[r].entries() {
                acc[t as usize] += w;
            }
        }
        let k = rows.len() as f64;
        for v in acc.iter_mut() {
            *v /= k;
        }
        acc
    }

    /// Cosine similarity of `profile` against every row, in row order.
    pub fn cosine_all(&self, profile: &[f64]) -> Vec<f64> {
        let p_norm = profile.iter().map(|x| x * x).sum::<f64>().sqrt();
        self.rows
            .par_iter()
            .map(|row| {
                let r_norm = row.norm();
                if p_norm == 0.0 || r_norm == 0.0 {
                    return 0.0;
                }
                (row.dot_dense(profile) / (p_norm * r_norm)).clamp(-1.0, 1.0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_unit_length() {
        let m = DocumentMatrix::fit(&["the cat sat on the mat", "the dog sat on the log"]);
        assert_eq!(m.n_rows(), 2);
        for i in 0..m.n_rows() {
            assert!((m.row(i).norm() - 1.0).abs() < 1e-9);
        }
        // the, cat, sat, on, mat, dog, log
        assert_eq!(m.vocabulary().len(), 7);
    }

    #[test]
    fn empty_document_is_zero_row() {
        let m = DocumentMatrix::fit(&["wizard kingdom", "  "]);
        assert!(m.row(1).entries().is_empty());
        let sims = m.cosine_all(&m.mean_of_rows(&[0]));
        assert_eq!(sims[1], 0.0);
    }

    #[test]
    fn weights_follow_tf_idf() {
        // "saves" in both docs (idf 1), "wizard" only in the first
        let m = DocumentMatrix::fit(&["wizard saves", "knight saves"]);
        let v = m.vocabulary();
        let idf_rare = (3.0f64 / 2.0).ln() + 1.0;
        let norm = (idf_rare * idf_rare + 1.0).sqrt();

        let row = m.row(0);
        let w = |term: &str| {
            let id = v.id(term).unwrap();
            row.entries().iter().find(|(t, _)| *t == id).unwrap().1
        };
        assert!((w("wizard") - idf_rare / norm).abs() < 1e-12);
        assert!((w("saves") - 1.0 / norm).abs() < 1e-12);
    }

    #[test]
    fn self_similarity_is_one() {
        let m = DocumentMatrix::fit(&["fantasy wizard", "romance love", "fantasy knight"]);
        let sims = m.cosine_all(&m.mean_of_rows(&[0]));
        assert!((sims[0] - 1.0).abs() < 1e-9);
        assert_eq!(sims[1], 0.0);
        assert!(sims[2] > 0.0 && sims[2] < 1.0);
    }

    #[test]
    fn mean_does_not_scale_with_selection_size() {
        let m = DocumentMatrix::fit(&["alpha beta", "alpha beta", "gamma"]);
        let one = m.mean_of_rows(&[0]);
        let two = m.mean_of_rows(&[0, 1]);
        for (a, b) in one.iter().zip(&two) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
