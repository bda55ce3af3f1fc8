use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use super::check_users_exist;
use crate::db::{self, repository};
use crate::error::AppError;
use crate::models::{
    NewProjectRequest, Project, ProjectListQuery, Task, TaskStatus, UpdateProjectRequest, User,
};
use crate::policy;

/// One board column: every task of a project in a given status, newest first.
#[derive(Debug, Serialize)]
pub struct StatusColumn {
    pub status: TaskStatus,
    pub label: &'static str,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub is_owner: bool,
    pub columns: Vec<StatusColumn>,
}

pub struct ProjectService {
    db: SqlitePool,
}

impl ProjectService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_projects_for(
        &self,
        user: &User,
        query: &ProjectListQuery,
    ) -> Result<Vec<Project>, AppError> {
        let mut conn = self.db.acquire().await?;
        let projects =
            repository::fetch_projects_visible_to(&mut conn, &user.id, query.search_term()).await?;
        Ok(projects)
    }

    pub async fn get_project_detail(&self, user: &User, id: &str) -> Result<ProjectDetail, AppError> {
        let mut conn = self.db.acquire().await?;
        let project = load_accessible_project(&mut conn, user, id).await?;
        let columns = status_columns(&mut conn, &project).await?;

        Ok(ProjectDetail {
            is_owner: policy::can_manage_project(user, &project),
            project,
            columns,
        })
    }

    pub async fn list_tasks_by_status(&self, project: &Project) -> Result<Vec<StatusColumn>, AppError> {
        let mut conn = self.db.acquire().await?;
        status_columns(&mut conn, project).await
    }

    /// Creates a project owned by `owner`. The owner always ends up in the
    /// member set, committed together with the project row.
    pub async fn create_project(
        &self,
        owner: &User,
        req: NewProjectRequest,
    ) -> Result<Project, AppError> {
        req.validate()?;

        let mut tx = db::begin_write(&self.db).await?;
        check_users_exist(&mut tx, "members", &req.members).await?;

        let description = req.description.unwrap_or_default();
        let mut project =
            repository::insert_project(&mut tx, &owner.id, req.name.trim(), &description).await?;
        repository::replace_members(&mut tx, &project.id, &req.members).await?;
        repository::ensure_member(&mut tx, &project.id, &owner.id).await?;
        project.members = repository::fetch_members(&mut tx, &project.id).await?;

        tx.commit().await?;

        info!(project_id = %project.id, owner = %owner.username, "project created");
        Ok(project)
    }

    pub async fn update_project(
        &self,
        actor: &User,
        id: &str,
        req: UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let mut tx = db::begin_write(&self.db).await?;
        let mut project = load_managed_project(&mut tx, actor, id).await?;
        req.validate()?;

        if let Some(name) = req.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = req.description {
            project.description = description;
        }
        repository::update_project(&mut tx, &project).await?;

        if let Some(members) = req.members {
            check_users_exist(&mut tx, "members", &members).await?;
            repository::replace_members(&mut tx, &project.id, &members).await?;
        }
        repository::ensure_member(&mut tx, &project.id, &project.owner_id).await?;
        project.members = repository::fetch_members(&mut tx, &project.id).await?;

        tx.commit().await?;

        info!(project_id = %project.id, "project updated");
        Ok(project)
    }

    pub async fn delete_project(&self, actor: &User, id: &str) -> Result<(), AppError> {
        let mut tx = db::begin_write(&self.db).await?;
        let project = load_managed_project(&mut tx, actor, id).await?;
        repository::delete_project(&mut tx, &project.id).await?;
        tx.commit().await?;

        info!(project_id = %project.id, "project deleted");
        Ok(())
    }
}

async fn load_accessible_project(
    conn: &mut SqliteConnection,
    user: &User,
    id: &str,
) -> Result<Project, AppError> {
    let project = repository::find_project(conn, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !policy::can_access_project(user, &project) {
        warn!(project_id = %id, user = %user.username, "project access denied");
        return Err(AppError::NotFound);
    }
    Ok(project)
}

async fn load_managed_project(
    conn: &mut SqliteConnection,
    user: &User,
    id: &str,
) -> Result<Project, AppError> {
    let project = repository::find_project(conn, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !policy::can_manage_project(user, &project) {
        warn!(project_id = %id, user = %user.username, "project management denied");
        return Err(AppError::NotFound);
    }
    Ok(project)
}

async fn status_columns(
    conn: &mut SqliteConnection,
    project: &Project,
) -> Result<Vec<StatusColumn>, AppError> {
    let tasks = repository::fetch_tasks_for_project(conn, &project.id).await?;
    Ok(group_by_status(tasks))
}

/// Splits tasks into one column per status, keeping their relative order.
fn group_by_status(tasks: Vec<Task>) -> Vec<StatusColumn> {
    let mut columns: Vec<StatusColumn> = TaskStatus::ALL
        .into_iter()
        .map(|status| StatusColumn {
            status,
            label: status.label(),
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
            column.tasks.push(task);
        }
    }
    columns
}
