pub mod comment;
pub mod project;
pub mod task;
pub mod user;
pub mod validation;

pub use comment::Comment;
pub use project::{NewProjectRequest, Project, ProjectListQuery, UpdateProjectRequest};
pub use task::{
    NewTask, NewTaskRequest, Task, TaskChanges, TaskPriority, TaskStatus, UpdateTaskRequest,
    UpdateTaskStatusRequest,
};
pub use user::User;
pub use validation::FieldErrors;
