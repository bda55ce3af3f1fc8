use sqlx::SqliteConnection;
use uuid::Uuid;

use super::timestamp;
use crate::models::Project;

const PROJECT_COLUMNS: &str = "p.id, p.name, p.description, p.owner_id, p.created_at";

pub async fn insert_project(
    conn: &mut SqliteConnection,
    owner_id: &str,
    name: &str,
    description: &str,
) -> Result<Project, sqlx::Error> {
    let project = Project {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        owner_id: owner_id.to_string(),
        created_at: timestamp(),
        members: Vec::new(),
    };

    sqlx::query(
        "INSERT INTO projects (id, name, description, owner_id, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&project.id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.owner_id)
    .bind(&project.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(project)
}

pub async fn find_project(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Project>, sqlx::Error> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?");
    let project = sqlx::query_as::<_, Project>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match project {
        Some(mut project) => {
            project.members = fetch_members(&mut *conn, &project.id).await?;
            Ok(Some(project))
        }
        None => Ok(None),
    }
}

/// Projects the user owns or belongs to, ordered by name. `search` is a
/// case-insensitive substring matched against name and description.
pub async fn fetch_projects_visible_to(
    conn: &mut SqliteConnection,
    user_id: &str,
    search: Option<&str>,
) -> Result<Vec<Project>, sqlx::Error> {
    let sql = format!(
        "SELECT {PROJECT_COLUMNS}
        FROM projects p
        WHERE (
            p.owner_id = ?1
            OR EXISTS (
                SELECT 1 FROM project_members m
                WHERE m.project_id = p.id AND m.user_id = ?1
            )
        )
        AND (
            ?2 IS NULL
            OR p.name LIKE ?2 ESCAPE '\\'
            OR p.description LIKE ?2 ESCAPE '\\'
        )
        ORDER BY p.name COLLATE NOCASE ASC, p.rowid ASC"
    );
    let pattern = search.map(like_pattern);

    let mut projects = sqlx::query_as::<_, Project>(&sql)
        .bind(user_id)
        .bind(pattern)
        .fetch_all(&mut *conn)
        .await?;

    for project in &mut projects {
        project.members = fetch_members(&mut *conn, &project.id).await?;
    }

    Ok(projects)
}

pub async fn fetch_members(
    conn: &mut SqliteConnection,
    project_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT m.user_id
        FROM project_members m
        JOIN users u ON u.id = m.user_id
        WHERE m.project_id = ?
        ORDER BY u.username ASC",
    )
    .bind(project_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn replace_members(
    conn: &mut SqliteConnection,
    project_id: &str,
    member_ids: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_members WHERE project_id = ?")
        .bind(project_id)
        .execute(&mut *conn)
        .await?;

    for user_id in member_ids {
        ensure_member(&mut *conn, project_id, user_id).await?;
    }

    Ok(())
}

pub async fn ensure_member(
    conn: &mut SqliteConnection,
    project_id: &str,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?, ?)")
        .bind(project_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn update_project(
    conn: &mut SqliteConnection,
    project: &Project,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE projects SET name = ?, description = ? WHERE id = ?")
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Deletes a project together with its tasks, their comments and all
/// memberships. Run inside a transaction.
pub async fn delete_project(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query(
        "DELETE FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE project_id = ?)",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM tasks WHERE project_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM project_members WHERE project_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{setup_test_db, user};

    #[tokio::test]
    async fn test_insert_and_find_project() {
        let pool = setup_test_db().await;
        let owner = user(&pool, "owner").await;
        let member = user(&pool, "member").await;
        let mut conn = pool.acquire().await.unwrap();

        let project = insert_project(&mut conn, &owner.id, "Demo", "")
            .await
            .unwrap();
        ensure_member(&mut conn, &project.id, &member.id).await.unwrap();
        ensure_member(&mut conn, &project.id, &member.id).await.unwrap();

        let found = find_project(&mut conn, &project.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Demo");
        assert_eq!(found.owner_id, owner.id);
        assert_eq!(found.members, vec![member.id.clone()]);

        assert!(find_project(&mut conn, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_visible_projects_ordered_by_name() {
        let pool = setup_test_db().await;
        let owner = user(&pool, "owner").await;
        let member = user(&pool, "member").await;
        let outsider = user(&pool, "outsider").await;
        let mut conn = pool.acquire().await.unwrap();

        let zeta = insert_project(&mut conn, &owner.id, "Zeta", "").await.unwrap();
        insert_project(&mut conn, &owner.id, "Alpha", "").await.unwrap();
        ensure_member(&mut conn, &zeta.id, &member.id).await.unwrap();

        let names: Vec<String> = fetch_projects_visible_to(&mut conn, &owner.id, None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);

        let for_member = fetch_projects_visible_to(&mut conn, &member.id, None)
            .await
            .unwrap();
        assert_eq!(for_member.len(), 1);
        assert_eq!(for_member[0].id, zeta.id);

        assert!(
            fetch_projects_visible_to(&mut conn, &outsider.id, None)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_name_ordering_ignores_case() {
        let pool = setup_test_db().await;
        let owner = user(&pool, "owner").await;
        let mut conn = pool.acquire().await.unwrap();

        insert_project(&mut conn, &owner.id, "Zeta", "").await.unwrap();
        insert_project(&mut conn, &owner.id, "alpha", "").await.unwrap();
        insert_project(&mut conn, &owner.id, "Beta", "").await.unwrap();

        let names: Vec<String> = fetch_projects_visible_to(&mut conn, &owner.id, None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
    }

    #[tokio::test]
    async fn test_search_matches_name_or_description() {
        let pool = setup_test_db().await;
        let owner = user(&pool, "owner").await;
        let mut conn = pool.acquire().await.unwrap();

        insert_project(&mut conn, &owner.id, "Website", "marketing relaunch")
            .await
            .unwrap();
        insert_project(&mut conn, &owner.id, "Backend", "").await.unwrap();
        insert_project(&mut conn, &owner.id, "100% done", "").await.unwrap();

        let hits = fetch_projects_visible_to(&mut conn, &owner.id, Some("MARKETING"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Website");

        let hits = fetch_projects_visible_to(&mut conn, &owner.id, Some("%"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% done");
    }

    #[tokio::test]
    async fn test_replace_members() {
        let pool = setup_test_db().await;
        let owner = user(&pool, "owner").await;
        let bob = user(&pool, "bob").await;
        let carol = user(&pool, "carol").await;
        let mut conn = pool.acquire().await.unwrap();

        let project = insert_project(&mut conn, &owner.id, "Demo", "").await.unwrap();
        replace_members(&mut conn, &project.id, &[bob.id.clone()])
            .await
            .unwrap();
        replace_members(&mut conn, &project.id, &[carol.id.clone()])
            .await
            .unwrap();

        let members = fetch_members(&mut conn, &project.id).await.unwrap();
        assert_eq!(members, vec![carol.id.clone()]);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
    }
}
