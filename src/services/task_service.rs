use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use super::check_users_exist;
use crate::db::{self, repository};
use crate::error::AppError;
use crate::models::{NewTaskRequest, Task, UpdateTaskRequest, UpdateTaskStatusRequest, User};
use crate::policy;

pub struct TaskService {
    db: SqlitePool,
}

impl TaskService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Creates a task under `project_id`. The project always comes from the
    /// caller's route; the request body cannot choose another one.
    pub async fn create_task(
        &self,
        actor: &User,
        project_id: &str,
        req: NewTaskRequest,
    ) -> Result<Task, AppError> {
        let mut tx = db::begin_write(&self.db).await?;

        let project = repository::find_project(&mut tx, project_id)
            .await?
            .filter(|project| policy::can_access_project(actor, project))
            .ok_or_else(|| {
                warn!(project_id = %project_id, user = %actor.username, "task create denied");
                AppError::NotFound
            })?;

        let fields = req.validate()?;
        if let Some(assignee_id) = &fields.assignee_id {
            check_users_exist(&mut tx, "assignee_id", std::slice::from_ref(assignee_id)).await?;
        }

        let task = repository::insert_task(&mut tx, &project.id, fields).await?;
        tx.commit().await?;

        info!(task_id = %task.id, project_id = %project.id, "task created");
        Ok(task)
    }

    pub async fn get_task_for_mutation(&self, actor: &User, id: &str) -> Result<Task, AppError> {
        let mut conn = self.db.acquire().await?;
        load_accessible_task(&mut conn, actor, id).await
    }

    pub async fn update_task(
        &self,
        actor: &User,
        id: &str,
        req: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        let mut tx = db::begin_write(&self.db).await?;
        let mut task = load_accessible_task(&mut tx, actor, id).await?;

        let changes = req.validate()?;
        if let Some(Some(assignee_id)) = &changes.assignee_id {
            check_users_exist(&mut tx, "assignee_id", std::slice::from_ref(assignee_id)).await?;
        }
        changes.apply_to(&mut task);

        repository::update_task(&mut tx, &mut task).await?;
        tx.commit().await?;

        info!(task_id = %task.id, "task updated");
        Ok(task)
    }

    /// Changes only the status. Any status may follow any other.
    pub async fn update_task_status(
        &self,
        actor: &User,
        id: &str,
        req: UpdateTaskStatusRequest,
    ) -> Result<Task, AppError> {
        let mut tx = db::begin_write(&self.db).await?;
        let mut task = load_accessible_task(&mut tx, actor, id).await?;

        task.status = req.validate()?;
        repository::update_task(&mut tx, &mut task).await?;
        tx.commit().await?;

        info!(task_id = %task.id, status = %task.status, "task status changed");
        Ok(task)
    }

    pub async fn delete_task(&self, actor: &User, id: &str) -> Result<(), AppError> {
        let mut tx = db::begin_write(&self.db).await?;
        let task = load_accessible_task(&mut tx, actor, id).await?;
        repository::delete_task(&mut tx, &task.id).await?;
        tx.commit().await?;

        info!(task_id = %task.id, project_id = %task.project_id, "task deleted");
        Ok(())
    }
}

async fn load_accessible_task(
    conn: &mut SqliteConnection,
    user: &User,
    id: &str,
) -> Result<Task, AppError> {
    let task = repository::find_task(&mut *conn, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let project = repository::find_project(&mut *conn, &task.project_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !policy::can_access_task(user, &task, &project) {
        warn!(task_id = %id, user = %user.username, "task access denied");
        return Err(AppError::NotFound);
    }
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{setup_test_db, user};
    use crate::models::{NewProjectRequest, Project, TaskPriority, TaskStatus};
    use crate::services::ProjectService;
    use chrono::{Duration, Utc};

    struct Fixture {
        pool: SqlitePool,
        owner: User,
        member: User,
        outsider: User,
        project: Project,
        task: Task,
    }

    async fn fixture() -> Fixture {
        let pool = setup_test_db().await;
        let owner = user(&pool, "owner").await;
        let member = user(&pool, "member").await;
        let outsider = user(&pool, "outsider").await;

        let project = ProjectService::new(pool.clone())
            .create_project(
                &owner,
                NewProjectRequest {
                    name: "Project Alpha".to_string(),
                    description: None,
                    members: vec![member.id.clone()],
                },
            )
            .await
            .unwrap();
        let task = TaskService::new(pool.clone())
            .create_task(
                &owner,
                &project.id,
                NewTaskRequest {
                    title: "Initial task".to_string(),
                    assignee_id: Some(member.id.clone()),
                    deadline: Some(Utc::now().date_naive().to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        Fixture {
            pool,
            owner,
            member,
            outsider,
            project,
            task,
        }
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let f = fixture().await;

        assert_eq!(f.task.status, TaskStatus::Todo);
        assert_eq!(f.task.priority, TaskPriority::Medium);
        assert_eq!(f.task.project_id, f.project.id);
        assert!(!f.task.is_overdue());
    }

    #[tokio::test]
    async fn test_create_task_requires_access() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        let req = NewTaskRequest {
            title: "Sneaky".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            service.create_task(&f.outsider, &f.project.id, req.clone()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service.create_task(&f.owner, "missing", req.clone()).await,
            Err(AppError::NotFound)
        ));

        let created = service.create_task(&f.member, &f.project.id, req).await.unwrap();
        assert_eq!(created.project_id, f.project.id);
    }

    #[tokio::test]
    async fn test_create_task_rejects_unknown_assignee() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        let err = service
            .create_task(
                &f.owner,
                &f.project.id,
                NewTaskRequest {
                    title: "Orphan".to_string(),
                    assignee_id: Some("ghost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.get("assignee_id").is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_member_updates_task() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        let updated = service
            .update_task(
                &f.member,
                &f.task.id,
                UpdateTaskRequest {
                    title: Some("Updated task".to_string()),
                    description: Some("Updated details".to_string()),
                    status: Some("doing".to_string()),
                    priority: Some(serde_json::json!(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Updated task");
        assert_eq!(updated.status, TaskStatus::Doing);
        assert_eq!(updated.priority, TaskPriority::Low);
        assert_eq!(updated.assignee_id, f.task.assignee_id);
        assert_eq!(updated.deadline, f.task.deadline);

        let reloaded = service.get_task_for_mutation(&f.owner, &f.task.id).await.unwrap();
        assert_eq!(reloaded.title, "Updated task");
        assert_eq!(reloaded.project_id, f.project.id);
    }

    #[tokio::test]
    async fn test_update_can_clear_assignee_and_deadline() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        let updated = service
            .update_task(
                &f.owner,
                &f.task.id,
                UpdateTaskRequest {
                    deadline: Some(None),
                    assignee_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.deadline.is_none());
        assert!(updated.assignee_id.is_none());
        assert_eq!(updated.title, "Initial task");
    }

    #[tokio::test]
    async fn test_status_change_by_member() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        let done = service
            .update_task_status(
                &f.member,
                &f.task.id,
                UpdateTaskStatusRequest {
                    status: "done".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Done);

        let back = service
            .update_task_status(
                &f.member,
                &f.task.id,
                UpdateTaskStatusRequest {
                    status: "todo".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(back.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_outsider_gets_not_found_and_nothing_changes() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        assert!(matches!(
            service.get_task_for_mutation(&f.outsider, &f.task.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service
                .update_task_status(
                    &f.outsider,
                    &f.task.id,
                    UpdateTaskStatusRequest {
                        status: "done".to_string(),
                    },
                )
                .await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service
                .update_task(
                    &f.outsider,
                    &f.task.id,
                    UpdateTaskRequest {
                        title: Some("Hijacked".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service.delete_task(&f.outsider, &f.task.id).await,
            Err(AppError::NotFound)
        ));

        let task = service.get_task_for_mutation(&f.owner, &f.task.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.title, "Initial task");
    }

    #[tokio::test]
    async fn test_invalid_status_rejected_without_change() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        let err = service
            .update_task_status(
                &f.member,
                &f.task.id,
                UpdateTaskStatusRequest {
                    status: "invalid".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let task = service.get_task_for_mutation(&f.member, &f.task.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_member_deletes_task() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());

        service.delete_task(&f.member, &f.task.id).await.unwrap();
        assert!(matches!(
            service.get_task_for_mutation(&f.owner, &f.task.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_overdue_task_created_with_past_deadline() {
        let f = fixture().await;
        let service = TaskService::new(f.pool.clone());
        let yesterday = Utc::now().date_naive() - Duration::days(1);

        let task = service
            .create_task(
                &f.owner,
                &f.project.id,
                NewTaskRequest {
                    title: "Overdue task".to_string(),
                    deadline: Some(yesterday.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(task.is_overdue());
    }
}
