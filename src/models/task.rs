use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Description stored when a task is created without one.
pub const DEFAULT_DESCRIPTION: &str = "Task created without a description";

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    Low,
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Active,
    Inactive,
}

/// Input structure for creating a task.
///
/// Only `title` is required; every other field falls back to its default.
/// A missing title deserializes as an empty string so that it is rejected by
/// the service with a validation error rather than a parse error.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub due_date: Option<DateTime<Utc>>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    pub completed: Option<bool>,
}

/// Partial update payload.
///
/// Fields are merged with [`Task::apply_update`], which only overwrites a
/// stored value when the supplied one is truthy. Falsy JSON values (`null`,
/// `false`, `0`, `""`) deserialize as `None` for every field, so a client
/// sending `{"priority": ""}` or `{"completed": 0}` leaves the task as is.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default, deserialize_with = "truthy")]
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "truthy")]
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "truthy")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "truthy")]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "truthy")]
    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "truthy_flag")]
    pub completed: Option<bool>,
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Falsy values become `None`; anything else must parse as `T`.
fn truthy<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if is_falsy(&value) {
        return Ok(None);
    }
    T::deserialize(value).map(Some).map_err(de::Error::custom)
}

/// Like [`truthy`] for booleans, with non-zero numbers counting as `true`.
fn truthy_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        ref v if is_falsy(v) => Ok(None),
        Value::Bool(_) | Value::Number(_) => Ok(Some(true)),
        other => Err(de::Error::custom(format!(
            "invalid value for completed: {}",
            other
        ))),
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Globally unique, trimmed, non-empty.
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub completed: bool,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a new task owned by `owner_id`, applying the defaults for
    /// every field the input leaves out. The title must already be trimmed.
    pub fn new(title: String, input: TaskInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: input
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            due_date: input.due_date.unwrap_or(now),
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            completed: input.completed.unwrap_or(false),
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `update` into the task.
    ///
    /// A supplied value replaces the stored one only when it is truthy: empty
    /// strings and `completed: false` are treated as if they were omitted, so
    /// this cannot clear `completed` once it is set. Clients rely on this.
    pub fn apply_update(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title.map(|t| t.trim().to_string()) {
            if !title.is_empty() {
                self.title = title;
            }
        }
        if let Some(description) = update.description {
            if !description.is_empty() {
                self.description = description;
            }
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.completed == Some(true) {
            self.completed = true;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_task() -> Task {
        Task::new(
            "Write report".to_string(),
            TaskInput {
                title: "Write report".to_string(),
                description: Some("Quarterly numbers".to_string()),
                ..Default::default()
            },
            1,
        )
    }

    #[test]
    fn test_task_creation_defaults() {
        let task = Task::new("Plain".to_string(), TaskInput::default(), 42);
        assert_eq!(task.user_id, 42);
        assert_eq!(task.description, DEFAULT_DESCRIPTION);
        assert_eq!(task.status, TaskStatus::Active);
        assert_eq!(task.priority, TaskPriority::Low);
        assert!(!task.completed);
        assert_eq!(task.due_date, task.created_at);
    }

    #[test]
    fn test_task_creation_overrides() {
        let input = TaskInput {
            title: "Ship it".to_string(),
            priority: Some(TaskPriority::High),
            status: Some(TaskStatus::Inactive),
            completed: Some(true),
            ..Default::default()
        };
        let task = Task::new("Ship it".to_string(), input, 3);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.status, TaskStatus::Inactive);
        assert!(task.completed);
    }

    #[test]
    fn test_update_ignores_falsy_values() {
        let mut task = sample_task();
        task.completed = true;

        task.apply_update(TaskUpdate {
            title: Some("".to_string()),
            description: Some("".to_string()),
            completed: Some(false),
            ..Default::default()
        });

        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "Quarterly numbers");
        assert!(task.completed);
    }

    #[test]
    fn test_update_overwrites_truthy_values() {
        let mut task = sample_task();

        task.apply_update(TaskUpdate {
            title: Some("  Write final report ".to_string()),
            priority: Some(TaskPriority::Medium),
            status: Some(TaskStatus::Inactive),
            completed: Some(true),
            ..Default::default()
        });

        assert_eq!(task.title, "Write final report");
        assert_eq!(task.description, "Quarterly numbers");
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Inactive);
        assert!(task.completed);
    }

    #[test]
    fn test_update_payload_treats_falsy_json_as_absent() {
        let update: TaskUpdate = serde_json::from_value(serde_json::json!({
            "title": "",
            "description": null,
            "dueDate": "",
            "priority": "",
            "status": 0,
            "completed": 0
        }))
        .unwrap();

        assert_eq!(update.title, None);
        assert_eq!(update.description, None);
        assert_eq!(update.due_date, None);
        assert_eq!(update.priority, None);
        assert_eq!(update.status, None);
        assert_eq!(update.completed, None);
    }

    #[test]
    fn test_update_payload_parses_truthy_json() {
        let update: TaskUpdate = serde_json::from_value(serde_json::json!({
            "dueDate": "2030-01-02T03:04:05Z",
            "priority": "high",
            "status": "inactive",
            "completed": 1
        }))
        .unwrap();

        assert_eq!(update.priority, Some(TaskPriority::High));
        assert_eq!(update.status, Some(TaskStatus::Inactive));
        assert_eq!(update.completed, Some(true));
        assert!(update.due_date.is_some());

        let missing: TaskUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.completed, None);

        assert!(serde_json::from_value::<TaskUpdate>(serde_json::json!({ "priority": "urgent" })).is_err());
        assert!(serde_json::from_value::<TaskUpdate>(serde_json::json!({ "completed": "yes" })).is_err());
    }

    #[test]
    fn test_task_json_uses_camel_case() {
        let json = serde_json::to_value(sample_task()).unwrap();
        assert!(json.get("dueDate").is_some());
        assert_eq!(json["userId"], 1);
        assert_eq!(json["status"], "active");
        assert_eq!(json["priority"], "low");
    }

    #[test]
    fn test_task_input_validation() {
        let long_title = TaskInput {
            title: "a".repeat(201),
            ..Default::default()
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskInput {
            title: "Fine".to_string(),
            description: Some("b".repeat(1001)),
            ..Default::default()
        };
        assert!(long_description.validate().is_err());
    }
}
