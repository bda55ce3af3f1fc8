use sqlx::SqlitePool;
use tracing::info;

use crate::db::{self, repository};
use crate::error::AppError;
use crate::models::{FieldErrors, User};

const USERNAME_MAX_CHARS: usize = 150;

/// User provisioning on behalf of the authentication collaborator.
pub struct UserService {
    db: SqlitePool,
}

impl UserService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, username: &str) -> Result<User, AppError> {
        let username = username.trim();
        let mut errors = FieldErrors::new();
        if username.is_empty() {
            errors.add("username", "This field is required.");
        } else if username.chars().count() > USERNAME_MAX_CHARS {
            errors.add(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX_CHARS} characters."),
            );
        }
        errors.into_result()?;

        let mut conn = self.db.acquire().await?;
        let user = match repository::insert_user(&mut conn, username).await {
            Ok(user) => user,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                let mut errors = FieldErrors::new();
                errors.add("username", "A user with that username already exists.");
                return Err(AppError::Validation(errors));
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Removes a user: owned projects (with their tasks and comments) and
    /// authored comments are deleted, assigned tasks become unassigned.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let mut tx = db::begin_write(&self.db).await?;
        if !repository::delete_user(&mut tx, id).await? {
            return Err(AppError::NotFound);
        }
        tx.commit().await?;

        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
