use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use tower::ServiceExt;

use task_service::{
    config::AppConfig, migration::Migrator, routes::router, state::AppState,
};

async fn app_state() -> std::sync::Arc<AppState> {
    let cfg = AppConfig::from_env().expect("load app config");
    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect to database");
    Migrator::up(&db, None).await.expect("apply migrations");
    AppState::new(db)
}

async fn send(
    state: &std::sync::Arc<AppState>,
    request: Request<Body>,
) -> axum::response::Response {
    router(state.clone()).oneshot(request).await.unwrap()
}

async fn json_response(
    state: &std::sync::Arc<AppState>,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = send(state, request).await;
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
#[ignore = "requires Postgres database"]
async fn oversized_title_surfaces_store_error() {
    let state = app_state().await;

    // The 100-char column bound is the only title ceiling; the handler
    // forwards longer titles and the insert fails.
    let (status, body) = json_response(
        &state,
        json_request("POST", "/api/tasks", json!({ "title": "x".repeat(150) })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "requires Postgres database"]
async fn task_crud_flow() {
    let state = app_state().await;

    let (status, first) = json_response(
        &state,
        json_request("POST", "/api/tasks", json!({ "title": "First task" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(first["id"].as_i64().unwrap() > 0);
    assert_eq!(first["completed"], false);
    assert_eq!(first["description"], "");
    assert_eq!(first["created_at"], first["updated_at"]);
    let first_id = first["id"].as_i64().unwrap();

    let (status, second) = json_response(
        &state,
        json_request(
            "POST",
            "/api/tasks",
            json!({ "title": "Second task", "description": "with details" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = second["id"].as_i64().unwrap();

    // Most recently created first.
    let (status, tasks) = json_response(
        &state,
        Request::builder()
            .uri("/api/tasks")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = tasks.as_array().unwrap();
    let first_pos = tasks
        .iter()
        .position(|t| t["id"].as_i64() == Some(first_id))
        .unwrap();
    let second_pos = tasks
        .iter()
        .position(|t| t["id"].as_i64() == Some(second_id))
        .unwrap();
    assert!(second_pos < first_pos);

    // Merge update: only completed changes, updated_at moves forward.
    let (status, updated) = json_response(
        &state,
        json_request(
            "PUT",
            &format!("/api/tasks/{first_id}"),
            json!({ "completed": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "First task");
    assert_eq!(updated["description"], "");
    assert!(updated["updated_at"].as_str().unwrap() >= first["updated_at"].as_str().unwrap());

    let (status, body) = json_response(
        &state,
        json_request("PUT", "/api/tasks/999999999", json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");

    let response = send(
        &state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/tasks/{second_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, tasks) = json_response(
        &state,
        Request::builder()
            .uri("/api/tasks")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        !tasks
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["id"].as_i64() == Some(second_id))
    );

    // Deleting again stays 404, never 500.
    let response = send(
        &state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/tasks/{second_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, health) = json_response(
        &state,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["database"], "connected");
    assert!(health["timestamp"].is_string());

    // Cleanup the remaining row.
    let response = send(
        &state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/tasks/{first_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
