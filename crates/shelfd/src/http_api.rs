use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shelf_store::CatalogStore;
use shelfmate::engine::{Engine, TrainReport};
use shelfmate::query::Recommendation;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{CorsConfig, ServiceConfig};
use crate::load_and_train;
use crate::types::{RecommendRequest, StatusResponse};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub store: Arc<dyn CatalogStore>,
    pub cfg: ServiceConfig,
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.cfg.cors);
    Router::new()
        .route("/api/recommendations", post(recommend_handler))
        .route("/api/status", get(status_handler))
        .route("/api/retrain", post(retrain_handler))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Preflight answers for the browser UI. Origins that are not valid header
/// values are logged and skipped; `*` must stand alone.
fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(cfg.max_age_seconds));

    match cfg.allowed_origins.as_slice() {
        [] => cors,
        [only] if only == "*" => cors.allow_origin(Any),
        origins if origins.iter().any(|o| o == "*") => {
            tracing::error!(?origins, "'*' must be the only CORS origin; CORS disabled");
            cors
        }
        origins => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::error!(origin = %o, "invalid CORS origin");
                        None
                    }
                })
                .collect();
            if allowed.is_empty() {
                cors
            } else {
                cors.allow_origin(AllowOrigin::list(allowed))
            }
        }
    }
}

pub async fn recommend_handler(
    State(st): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<Vec<Recommendation>>, (StatusCode, String)> {
    let ids = req.ids().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    if ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let limit = st.cfg.effective_limit(req.limit);
    let recs = st.engine.recommend(&ids, limit);
    tracing::debug!(selected = ids.len(), limit, returned = recs.len(), "recommend");
    Ok(Json(recs))
}

pub async fn status_handler(State(st): State<AppState>) -> Json<StatusResponse> {
    let s = st.engine.status();
    Json(StatusResponse {
        status: if s.trained { "online" } else { "not_ready" },
        trained: s.trained,
        books_loaded: s.books_loaded,
        vocabulary_size: s.vocabulary_size,
        generation: s.generation,
        service: "shelfd",
    })
}

/// Full-replace retrain from the store.
pub async fn retrain_handler(
    State(st): State<AppState>,
) -> Result<Json<TrainReport>, (StatusCode, String)> {
    match load_and_train(&st.engine, st.store.as_ref()).await {
        Ok(Ok(report)) => Ok(Json(report)),
        Ok(Err(e)) => Err((StatusCode::SERVICE_UNAVAILABLE, e.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "retrain failed");
            Err(internal(e))
        }
    }
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn internal<E: ToString>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
