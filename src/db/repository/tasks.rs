use sqlx::SqliteConnection;
use uuid::Uuid;

use super::timestamp;
use crate::models::{NewTask, Task};

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, deadline, \
    assignee_id, created_at, updated_at";

pub async fn insert_task(
    conn: &mut SqliteConnection,
    project_id: &str,
    new_task: NewTask,
) -> Result<Task, sqlx::Error> {
    let now = timestamp();
    let task = Task {
        id: Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        title: new_task.title,
        description: new_task.description,
        status: new_task.status,
        priority: new_task.priority,
        deadline: new_task.deadline,
        assignee_id: new_task.assignee_id,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO tasks
            (id, project_id, title, description, status, priority,
            deadline, assignee_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task.id)
    .bind(&task.project_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.deadline)
    .bind(&task.assignee_id)
    .bind(&task.created_at)
    .bind(&task.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(task)
}

pub async fn find_task(conn: &mut SqliteConnection, id: &str) -> Result<Option<Task>, sqlx::Error> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?");
    sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Tasks of a project, newest first.
pub async fn fetch_tasks_for_project(
    conn: &mut SqliteConnection,
    project_id: &str,
) -> Result<Vec<Task>, sqlx::Error> {
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? \
        ORDER BY created_at DESC, rowid DESC"
    );
    sqlx::query_as::<_, Task>(&sql)
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
}

/// Persists every mutable field of `task` and bumps `updated_at`. The owning
/// project is never written.
pub async fn update_task(conn: &mut SqliteConnection, task: &mut Task) -> Result<bool, sqlx::Error> {
    task.updated_at = timestamp();

    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET title = ?1,
            description = ?2,
            status = ?3,
            priority = ?4,
            deadline = ?5,
            assignee_id = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.deadline)
    .bind(&task.assignee_id)
    .bind(&task.updated_at)
    .bind(&task.id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Deletes a task and its comments. Run inside a transaction.
pub async fn delete_task(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query("DELETE FROM comments WHERE task_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Unassigns every task assigned to `user_id`, returning how many changed.
pub async fn clear_assignee(conn: &mut SqliteConnection, user_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tasks SET assignee_id = NULL, updated_at = ? WHERE assignee_id = ?",
    )
    .bind(timestamp())
    .bind(user_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(result)
}
