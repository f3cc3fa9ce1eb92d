use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;

/// Term <-> column mapping with smoothed inverse document frequencies.
pub struct Vocabulary {
    term2id: HashMap<String, TermId>,
    idf: Vec<f64>,
}

impl Vocabulary {
    /// `doc_terms` holds per-document term counts. Columns are assigned in
    /// lexicographic term order.
    pub fn build(doc_terms: &[BTreeMap<String, u32>]) -> Self {
        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for terms in doc_terms {
            for term in terms.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let n_docs = doc_terms.len() as f64;
        let mut term2id = HashMap::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (term, count) in df {
            term2id.insert(term.to_string(), idf.len() as TermId);
            idf.push(smooth_idf(n_docs, count as f64));
        }

        Self { term2id, idf }
    }

    pub fn id(&self, term: &str) -> Option<TermId> {
        self.term2id.get(term).copied()
    }

    pub fn idf(&self, id: TermId) -> f64 {
        self.idf[id as usize]
    }

    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }
}

/// idf(t) = ln((1 + n) / (1 + df)) + 1
fn smooth_idf(n_docs: f64, df: f64) -> f64 {
    ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
}
