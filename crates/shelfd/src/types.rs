use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelfmate::catalog::BookId;
use shelfmate::query::{parse_id, QueryError};

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    /// Integers or numeric strings; anything else is a client error
    #[serde(default)]
    pub book_ids: Vec<Value>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RecommendRequest {
    pub fn ids(&self) -> Result<Vec<BookId>, QueryError> {
        self.book_ids.iter().map(coerce_id).collect()
    }
}

fn coerce_id(v: &Value) -> Result<BookId, QueryError> {
    match v {
        Value::Number(n) => n.as_i64().ok_or_else(|| QueryError::InvalidId(n.to_string())),
        Value::String(s) => parse_id(s),
        other => Err(QueryError::InvalidId(other.to_string())),
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub trained: bool,
    pub books_loaded: usize,
    pub vocabulary_size: usize,
    pub generation: u64,
    pub service: &'static str,
}
