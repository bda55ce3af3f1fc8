use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{FieldErrors, check_text};

pub const PROJECT_NAME_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub created_at: String,
    /// Explicit member ids, loaded separately from `project_members`.
    #[sqlx(skip)]
    pub members: Vec<String>,
}

impl Project {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl NewProjectRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, PROJECT_NAME_MAX_CHARS);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<String>>,
}

impl UpdateProjectRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            check_text(&mut errors, "name", name, PROJECT_NAME_MAX_CHARS);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListQuery {
    /// Case-insensitive substring matched against name and description.
    pub q: Option<String>,
}

impl ProjectListQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}
