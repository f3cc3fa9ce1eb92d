use crate::catalog::{BookId, BookRecord};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_LIMIT: usize = 3;

/// Why a book was recommended. Rendered as a human readable string.
#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    SimilarPlot { percent: u8 },
    Author(String),
    Genre(String),
    Quality(f64),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::SimilarPlot { percent } => write!(f, "Similar plot: {percent}%"),
            Reason::Author(a) => write!(f, "Author: {a}"),
            Reason::Genre(g) => write!(f, "Genre: {g}"),
            // {:?} keeps the trailing ".0" on whole ratings (5.0★, not 5★)
            Reason::Quality(r) => write!(f, "Quality: {r:?}★"),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub book: Arc<BookRecord>,
    /// Truncated percentage of the cosine similarity, 1..=100
    pub score: u8,
    pub reasons: Vec<Reason>,
    #[serde(skip)]
    pub similarity: f64,
}

#[derive(Debug, Clone)]
pub struct QueryOpts {
    pub limit: usize,
}

impl Default for QueryOpts {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("not a book id: {0:?}")]
    InvalidId(String),
    #[error("--limit expects a number, got {0:?}")]
    InvalidLimit(String),
    #[error("no book ids given")]
    NoIds,
}

/// Parse an interactive query: ids separated by spaces and/or commas, optional `--limit N`.
pub fn parse_query(s: &str) -> Result<(Vec<BookId>, QueryOpts), QueryError> {
    let mut parts: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    let mut opts = QueryOpts::default();

    let mut i = 0;
    while i < parts.len() {
        if parts[i] == "--limit" && i + 1 < parts.len() {
            opts.limit = parts[i + 1]
                .parse()
                .map_err(|_| QueryError::InvalidLimit(parts[i + 1].to_string()))?;
            parts.drain(i..=i + 1);
        } else {
            i += 1;
        }
    }

    let ids = parts
        .iter()
        .map(|p| parse_id(p))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(QueryError::NoIds);
    }
    Ok((ids, opts))
}

/// Coerce a textual identifier ("42", " 7 ") into a book id.
pub fn parse_id(s: &str) -> Result<BookId, QueryError> {
    s.trim()
        .parse()
        .map_err(|_| QueryError::InvalidId(s.to_string()))
}
