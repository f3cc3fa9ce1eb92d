#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt as _;
use serde_json::{json, Value};
use shelf_store::{CatalogStore, MemoryCatalogStore};
use shelfd::config::ServiceConfig;
use shelfd::http_api::{router, AppState};
use shelfmate::catalog::BookRecord;
use shelfmate::engine::Engine;
use std::sync::Arc;
use tower::ServiceExt;

pub fn books() -> Vec<BookRecord> {
    serde_json::from_value(json!([
        {"id": 1, "title": "Spellbound", "author": "X", "genre": "Fantasy",
         "synopsis": "a wizard saves a kingdom", "rating": 4.8},
        {"id": 2, "title": "Iron Oath", "author": "Y", "genre": "Fantasy, Adventure",
         "synopsis": "a knight saves a kingdom", "rating": 4.0},
        {"id": 3, "title": "Heartstrings", "author": "Z", "genre": "Romance",
         "synopsis": "two people fall in love", "rating": 3.5},
        {"id": 4, "title": "Crownfall", "author": "X", "genre": "Fantasy",
         "synopsis": "a wizard loses a kingdom", "rating": 4.9}
    ]))
    .unwrap()
}

/// Router over a memory store holding `books`; trains the engine first when `train` is set.
pub fn make_app(
    books: Vec<BookRecord>,
    cfg: ServiceConfig,
    train: bool,
) -> (Router, MemoryCatalogStore) {
    let engine = Arc::new(Engine::new());
    if train {
        engine.train(books.clone()).unwrap();
    }
    let mem = MemoryCatalogStore::with_books(books);
    let store: Arc<dyn CatalogStore> = Arc::new(mem.clone());
    (router(AppState { engine, store, cfg }), mem)
}

pub fn trained_app() -> Router {
    make_app(books(), ServiceConfig::default(), true).0
}

pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes)
}

pub async fn call_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = call(app, method, uri, body).await;
    let v = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, v)
}
