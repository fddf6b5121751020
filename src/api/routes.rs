//! Router assembly for the ingest API (§4.5).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes as usize;

    Router::new()
        .route("/classify_file", post(handlers::classify_file))
        .route(
            "/classification/:task_id",
            get(handlers::get_classification_status),
        )
        .route("/health", get(handlers::health))
        .route("/scaling/status", get(handlers::scaling_status))
        .route("/scaling/workers/:n", post(handlers::set_worker_count))
        .layer(RequestBodyLimitLayer::new(upload_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
