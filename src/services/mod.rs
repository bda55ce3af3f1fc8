pub mod project_service;
pub mod task_service;
pub mod user_service;

pub use project_service::{ProjectDetail, ProjectService, StatusColumn};
pub use task_service::TaskService;
pub use user_service::UserService;

use sqlx::SqliteConnection;

use crate::db::repository;
use crate::error::AppError;
use crate::models::FieldErrors;

/// Rejects references to users that do not exist, reported against `field`.
async fn check_users_exist(
    conn: &mut SqliteConnection,
    field: &'static str,
    ids: &[String],
) -> Result<(), AppError> {
    let missing = repository::missing_user_ids(conn, ids).await?;
    if let Some(id) = missing.first() {
        let mut errors = FieldErrors::new();
        errors.add(
            field,
            format!("Select a valid choice. {id} is not one of the available choices."),
        );
        return Err(AppError::Validation(errors));
    }
    Ok(())
}
