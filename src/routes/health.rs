use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{db::task_repo, state::AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Reports liveness of the store with a store-side timestamp. Failures do
/// not use the `{"error"}` envelope; the payload carries a status field.
async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    match task_repo::store_timestamp(&state.db).await {
        Ok(now) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "timestamp": now.to_rfc3339(),
            })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "error": err.to_string(),
            })),
        )
            .into_response(),
    }
}
