use std::sync::Arc;

use axum::Router;

use crate::{error::AppError, state::AppState};

pub mod docs;
pub mod health;
pub mod tasks;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(tasks::router(state.clone()))
        .merge(health::router(state))
        .merge(docs::router())
        .fallback(fallback)
}

async fn fallback() -> AppError {
    AppError::NotFound
}
