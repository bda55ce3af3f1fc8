use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sqlx::FromRow;

use super::validation::{FieldErrors, check_text};

pub const TASK_TITLE_MAX_CHARS: usize = 200;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    /// Board columns, in declaration order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::Doing => "Doing",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[repr(i32)]
pub enum TaskPriority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

impl TaskPriority {
    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(TaskPriority::Low),
            2 => Some(TaskPriority::Medium),
            3 => Some(TaskPriority::High),
            _ => None,
        }
    }
}

impl Serialize for TaskPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.value())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<NaiveDate>,
    pub assignee_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// True when a deadline is set and lies strictly before today (UTC).
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.deadline.is_some_and(|deadline| deadline < today)
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Task", 12)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("project_id", &self.project_id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("priority", &self.priority)?;
        state.serialize_field("priority_label", self.priority.label())?;
        state.serialize_field("deadline", &self.deadline)?;
        state.serialize_field("assignee_id", &self.assignee_id)?;
        state.serialize_field("is_overdue", &self.is_overdue())?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.end()
    }
}

/// Validated field values for a new task. The owning project is supplied
/// separately by the caller's route.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<NaiveDate>,
    pub assignee_id: Option<String>,
}

/// Validated partial update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<Option<NaiveDate>>,
    pub assignee_id: Option<Option<String>>,
}

impl TaskChanges {
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Raw JSON so a mistyped value is reported against the field.
    #[serde(default)]
    pub priority: Option<Value>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
}

impl NewTaskRequest {
    pub fn validate(self) -> Result<NewTask, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "title", &self.title, TASK_TITLE_MAX_CHARS);
        let status = match self.status.as_deref() {
            Some(raw) => parse_status(&mut errors, raw),
            None => Some(TaskStatus::default()),
        };
        let priority = match &self.priority {
            Some(raw) => parse_priority(&mut errors, raw),
            None => Some(TaskPriority::default()),
        };
        let deadline = match self.deadline.as_deref() {
            Some(raw) => parse_deadline(&mut errors, raw),
            None => Some(None),
        };

        match (status, priority, deadline) {
            (Some(status), Some(priority), Some(deadline)) if errors.is_empty() => Ok(NewTask {
                title: self.title.trim().to_string(),
                description: self.description.unwrap_or_default(),
                status,
                priority,
                deadline,
                assignee_id: self.assignee_id,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub deadline: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub assignee_id: Option<Option<String>>,
}

impl UpdateTaskRequest {
    pub fn validate(self) -> Result<TaskChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            check_text(&mut errors, "title", title, TASK_TITLE_MAX_CHARS);
        }
        let status = self
            .status
            .as_deref()
            .and_then(|raw| parse_status(&mut errors, raw));
        let priority = self
            .priority
            .as_ref()
            .and_then(|raw| parse_priority(&mut errors, raw));
        let deadline = match self.deadline {
            Some(Some(raw)) => parse_deadline(&mut errors, &raw),
            Some(None) => Some(None),
            None => None,
        };

        errors.into_result()?;
        Ok(TaskChanges {
            title: self.title.map(|title| title.trim().to_string()),
            description: self.description,
            status,
            priority,
            deadline,
            assignee_id: self.assignee_id,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskStatusRequest {
    #[serde(default)]
    pub status: String,
}

impl UpdateTaskStatusRequest {
    pub fn validate(&self) -> Result<TaskStatus, FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.status.trim().is_empty() {
            errors.add("status", "This field is required.");
            return Err(errors);
        }
        match parse_status(&mut errors, &self.status) {
            Some(status) => Ok(status),
            None => Err(errors),
        }
    }
}

fn parse_status(errors: &mut FieldErrors, raw: &str) -> Option<TaskStatus> {
    let status = TaskStatus::parse(raw);
    if status.is_none() {
        errors.add(
            "status",
            format!("Select a valid choice. {raw} is not one of the available choices."),
        );
    }
    status
}

/// Accepts the integer choice or its decimal string form.
fn parse_priority(errors: &mut FieldErrors, raw: &Value) -> Option<TaskPriority> {
    let priority = match raw {
        Value::Number(n) => n.as_i64().and_then(TaskPriority::from_value),
        Value::String(s) => s.trim().parse().ok().and_then(TaskPriority::from_value),
        _ => None,
    };
    if priority.is_none() {
        let shown = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        errors.add(
            "priority",
            format!("Select a valid choice. {shown} is not one of the available choices."),
        );
    }
    priority
}

fn parse_deadline(errors: &mut FieldErrors, raw: &str) -> Option<Option<NaiveDate>> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(Some(date)),
        Err(_) => {
            errors.add("deadline", "Enter a valid date.");
            None
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
