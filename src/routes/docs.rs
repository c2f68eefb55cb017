use axum::{Router, response::Html, routing::get};
use tower_http::services::ServeDir;

/// Swagger UI page at /api/docs; the OpenAPI document and other assets are
/// served from the static directory.
pub fn router() -> Router {
    Router::new()
        .route("/api/docs", get(swagger_ui))
        .nest_service("/static", ServeDir::new("static"))
}

async fn swagger_ui() -> Html<&'static str> {
    Html(include_str!("../../static/docs.html"))
}
