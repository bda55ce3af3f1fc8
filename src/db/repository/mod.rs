//! SQL access for users, projects, tasks and comments.
//!
//! Functions take a `&mut SqliteConnection` so callers can run several of
//! them inside one transaction. Cascade-delete and set-null rules are
//! carried out here explicitly rather than left to foreign key actions.

mod comments;
mod projects;
mod tasks;
mod users;

use chrono::{SecondsFormat, Utc};

pub use comments::{fetch_comments_for_task, insert_comment};
pub use projects::{
    delete_project, ensure_member, fetch_members, fetch_projects_visible_to, find_project,
    insert_project, replace_members, update_project,
};
pub use tasks::{
    clear_assignee, delete_task, fetch_tasks_for_project, find_task, insert_task, update_task,
};
pub use users::{delete_user, find_user_by_token, insert_user, missing_user_ids};

/// Fixed-width RFC 3339 timestamp, so lexical order matches time order.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
