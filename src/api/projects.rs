use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use super::extract::JsonBody;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{NewProjectRequest, Project, ProjectListQuery, UpdateProjectRequest};
use crate::services::{ProjectDetail, ProjectService};
use crate::state::AppState;

pub(super) async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = ProjectService::new(state.db)
        .list_projects_for(&user, &query)
        .await?;
    Ok(Json(projects))
}

pub(super) async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<NewProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = ProjectService::new(state.db)
        .create_project(&user, req)
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub(super) async fn get_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetail>, AppError> {
    let detail = ProjectService::new(state.db)
        .get_project_detail(&user, &id)
        .await?;
    Ok(Json(detail))
}

pub(super) async fn update_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let project = ProjectService::new(state.db)
        .update_project(&user, &id, req)
        .await?;
    Ok(Json(project))
}

pub(super) async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ProjectService::new(state.db)
        .delete_project(&user, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
