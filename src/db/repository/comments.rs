use sqlx::SqliteConnection;
use uuid::Uuid;

use super::timestamp;
use crate::models::Comment;

pub async fn insert_comment(
    conn: &mut SqliteConnection,
    task_id: &str,
    author_id: &str,
    text: &str,
) -> Result<Comment, sqlx::Error> {
    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        task_id: task_id.to_string(),
        author_id: author_id.to_string(),
        text: text.to_string(),
        created_at: timestamp(),
    };

    sqlx::query(
        "INSERT INTO comments (id, task_id, author_id, text, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&comment.id)
    .bind(&comment.task_id)
    .bind(&comment.author_id)
    .bind(&comment.text)
    .bind(&comment.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(comment)
}

/// Comments on a task, oldest first.
pub async fn fetch_comments_for_task(
    conn: &mut SqliteConnection,
    task_id: &str,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT id, task_id, author_id, text, created_at
        FROM comments
        WHERE task_id = ?
        ORDER BY created_at ASC, rowid ASC",
    )
    .bind(task_id)
    .fetch_all(&mut *conn)
    .await
}
