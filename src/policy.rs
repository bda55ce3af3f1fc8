//! Access rules for projects and tasks.
//!
//! The access set of a project is its owner plus its explicit members.
//! Anyone in the access set may read the project and create, edit or delete
//! its tasks; only the owner may edit or delete the project itself.

use crate::models::{Project, Task, User};

pub fn can_access_project(user: &User, project: &Project) -> bool {
    project.owner_id == user.id || project.has_member(&user.id)
}

/// `project` must be the task's own project; a mismatched pair never grants
/// access.
pub fn can_access_task(user: &User, task: &Task, project: &Project) -> bool {
    task.project_id == project.id && can_access_project(user, project)
}

pub fn can_manage_project(user: &User, project: &Project) -> bool {
    project.owner_id == user.id
}
