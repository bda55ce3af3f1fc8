use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::extract::JsonBody;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{NewTaskRequest, Task, UpdateTaskRequest, UpdateTaskStatusRequest};
use crate::services::TaskService;
use crate::state::AppState;

pub(super) async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<String>,
    JsonBody(req): JsonBody<NewTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = TaskService::new(state.db)
        .create_task(&user, &project_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn get_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let task = TaskService::new(state.db)
        .get_task_for_mutation(&user, &id)
        .await?;
    Ok(Json(task))
}

pub(super) async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = TaskService::new(state.db)
        .update_task(&user, &id, req)
        .await?;
    Ok(Json(task))
}

pub(super) async fn update_task_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateTaskStatusRequest>,
) -> Result<Json<Task>, AppError> {
    let task = TaskService::new(state.db)
        .update_task_status(&user, &id, req)
        .await?;
    Ok(Json(task))
}

pub(super) async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    TaskService::new(state.db).delete_task(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
