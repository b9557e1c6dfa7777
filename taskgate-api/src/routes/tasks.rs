/// Task endpoints
///
/// - `POST /api/v1/tasks` - Create a task owned by the caller
/// - `GET /api/v1/tasks` - Own tasks, or every task for admins
/// - `PUT /api/v1/tasks/:id` - Partial update (owner or admin)
/// - `DELETE /api/v1/tasks/:id` - Delete (owner or admin)
///
/// For update and delete the checks run in a fixed order: the task must
/// exist (404), the caller must own it or be an admin (403), and only then
/// is the body looked at (400).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use taskgate_shared::auth::{authorization::require_ownership, middleware::AuthContext};
use taskgate_shared::models::task::{CreateTask, Task, UpdateTask, MAX_TITLE_LENGTH};
use tracing::info;

/// Task create/update request
///
/// The outer `Option` records whether the field was sent at all, the inner
/// one whether it was `null`. For updates, absent fields keep their current
/// value; a `null` title is rejected like an empty one and a `null`
/// description clears it.
#[derive(Debug, Default, Deserialize)]
pub struct TaskRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Reads a task body, rejecting anything but a non-empty JSON object
fn task_request(payload: Result<Json<Value>, JsonRejection>) -> Result<TaskRequest, ApiError> {
    let Json(value) = payload?;

    if value.as_object().map_or(true, |fields| fields.is_empty()) {
        return Err(ApiError::BadRequest("No data provided".to_string()));
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(reason = %e, "Rejected task body");
        ApiError::BadRequest("Invalid JSON body".to_string())
    })
}

/// Plain confirmation body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Task creation response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub message: String,
    pub task_id: i64,
}

/// Task list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

/// Checks a title about to be stored
///
/// The title must contain something other than whitespace and be at most
/// 200 characters. It is stored exactly as given.
pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::BadRequest("Title too long".to_string()));
    }
    Ok(())
}

fn task_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

async fn find_task(state: &AppState, id: i64) -> Result<Task, ApiError> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Creates a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    let req = task_request(payload)?;

    let title = req.title.flatten().unwrap_or_default();
    validate_title(&title)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title,
            description: req.description.flatten().unwrap_or_default(),
            user_id: auth.user_id,
        },
    )
    .await?;

    info!(user_id = auth.user_id, task_id = task.id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: "Task created successfully".to_string(),
            task_id: task.id,
        }),
    ))
}

/// Lists tasks visible to the caller
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<TasksResponse>> {
    let tasks = if auth.is_admin() {
        Task::list_all(&state.db).await?
    } else {
        Task::list_by_owner(&state.db, auth.user_id).await?
    };

    Ok(Json(TasksResponse { tasks }))
}

/// Updates a task
///
/// # Errors
///
/// - `404 Not Found`: no such task
/// - `403 Forbidden`: caller is neither owner nor admin
/// - `400 Bad Request`: malformed or empty body, or invalid title
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let task = find_task(&state, task_id(id)?).await?;
    require_ownership(&auth, task.user_id)?;

    let req = task_request(payload)?;

    let title = match req.title {
        Some(title) => title.unwrap_or_default(),
        None => task.title,
    };
    validate_title(&title)?;

    Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: Some(title),
            description: req.description.map(Option::unwrap_or_default),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    info!(user_id = auth.user_id, task_id = task.id, "Task updated");

    Ok(Json(MessageResponse::new("Task updated successfully")))
}

/// Deletes a task
///
/// # Errors
///
/// - `404 Not Found`: no such task
/// - `403 Forbidden`: caller is neither owner nor admin
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let task = find_task(&state, task_id(id)?).await?;
    require_ownership(&auth, task.user_id)?;

    if !Task::delete(&state.db, task.id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    info!(user_id = auth.user_id, task_id = task.id, "Task deleted");

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
