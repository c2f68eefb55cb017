use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    db::{
        entities::task,
        task_repo::{self, NewTask, TaskChanges},
    },
    error::AppError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Absent keys keep the stored value; `description: null` clears it.
/// A null `title` or `completed` is treated like an absent key rather than
/// being pushed into its not-null column.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .with_state(state)
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let tasks = task_repo::list_tasks(&state.db).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let payload: CreateTaskRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("Title is required"))?;
    let Some(title) = payload.title else {
        return Err(AppError::Validation("Title is required"));
    };
    let task = task_repo::create_task(
        &state.db,
        NewTask {
            title,
            description: Some(payload.description.unwrap_or_default()),
            completed: payload.completed.unwrap_or(false),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TaskResponse>, AppError> {
    let id = parse_id(&id)?;
    // Existence is checked before the body so an unknown id is always 404.
    task_repo::find_task(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Only a missing, unparseable, or empty body is "no data"; an object
    // carrying no recognized keys still goes through as a no-op merge.
    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| AppError::Validation("No data provided"))?;
    if payload.as_object().is_none_or(|map| map.is_empty()) {
        return Err(AppError::Validation("No data provided"));
    }
    let changes: UpdateTaskRequest =
        serde_json::from_value(payload).map_err(|_| AppError::Validation("No data provided"))?;

    let task = task_repo::update_task(
        &state.db,
        id,
        TaskChanges {
            title: changes.title,
            description: changes.description,
            completed: changes.completed,
        },
    )
    .await?
    .ok_or(AppError::NotFound)?;
    Ok(Json(task.into()))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let deleted = task_repo::delete_task(&state.db, id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// Non-numeric ids never match a row, so they 404 like any unknown id.
fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>().map_err(|_| AppError::NotFound)
}

impl From<task::Model> for TaskResponse {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            completed: model.completed,
            created_at: Some(model.created_at.to_rfc3339()),
            updated_at: Some(model.updated_at.to_rfc3339()),
        }
    }
}
