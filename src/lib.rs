pub mod catalog;
pub mod engine;
pub mod index;
pub mod query;

pub use catalog::{BookId, BookRecord, CatalogError, CatalogSnapshot};
pub use engine::{Engine, EngineStatus, Model, TrainReport, TrainedState};
pub use query::{parse_query, Reason, Recommendation};
