use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{projects, tasks, timestamp};
use crate::models::User;

pub async fn insert_user(conn: &mut SqliteConnection, username: &str) -> Result<User, sqlx::Error> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        api_token: Uuid::new_v4().simple().to_string(),
        created_at: timestamp(),
    };

    sqlx::query("INSERT INTO users (id, username, api_token, created_at) VALUES (?, ?, ?, ?)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.api_token)
        .bind(&user.created_at)
        .execute(&mut *conn)
        .await?;

    Ok(user)
}

pub async fn find_user_by_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, api_token, created_at FROM users WHERE api_token = ?",
    )
    .bind(token)
    .fetch_optional(&mut *conn)
    .await
}

/// Returns the ids from `ids` that do not name an existing user, in input order.
pub async fn missing_user_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> Result<Vec<String>, sqlx::Error> {
    let mut missing = Vec::new();
    for id in ids {
        let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .is_some();
        if !exists && !missing.contains(id) {
            missing.push(id.clone());
        }
    }
    Ok(missing)
}

/// Deletes a user. Owned projects and authored comments go with it, task
/// assignments are cleared and memberships removed. Run inside a transaction.
pub async fn delete_user(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
    tasks::clear_assignee(&mut *conn, id).await?;

    sqlx::query("DELETE FROM comments WHERE author_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let owned: Vec<String> = sqlx::query_scalar("SELECT id FROM projects WHERE owner_id = ?")
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;
    for project_id in owned {
        projects::delete_project(&mut *conn, &project_id).await?;
    }

    sqlx::query("DELETE FROM project_members WHERE user_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}
