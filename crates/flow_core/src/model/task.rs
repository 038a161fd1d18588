use crate::config::canonical_key;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::Date;
use uuid::Uuid;

time::serde::format_description!(due_date_format, Date, "[year]-[month]-[day]");

/// Opaque task identity, stable for the task's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// Short random id; callers check it against the live collection.
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("task-{}", &raw[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub course: String,
    #[serde(with = "due_date_format")]
    pub due_date: Date,
    pub status: TaskStatus,
    pub priority: Priority,
}

/// Fields of a task that does not have an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub course: String,
    pub due_date: Date,
    pub status: TaskStatus,
    pub priority: Priority,
}

impl NewTask {
    pub(crate) fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            course: self.course,
            due_date: self.due_date,
            status: self.status,
            priority: self.priority,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub course: Option<String>,
    pub due_date: Option<Date>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.course.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(course) = self.course {
            task.course = course;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "Working on it")]
    InProgress,
    Stuck,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Stuck,
        TaskStatus::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "Working on it",
            Self::Stuck => "Stuck",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_key(raw).as_str() {
            "not_started" | "notstarted" | "todo" => Ok(Self::NotStarted),
            "in_progress" | "inprogress" | "working" | "working_on_it" => Ok(Self::InProgress),
            "stuck" => Ok(Self::Stuck),
            "done" | "completed" => Ok(Self::Done),
            _ => Err(AppError::invalid_input(format!("unknown status '{}'", raw.trim()))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_key(raw).as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(AppError::invalid_input(format!(
                "unknown priority '{}'",
                raw.trim()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task, TaskId, TaskPatch, TaskStatus};
    use time::macros::date;

    fn essay() -> Task {
        Task {
            id: TaskId::new("1"),
            title: "Essay".to_string(),
            course: "History 101".to_string(),
            due_date: date!(2025 - 03 - 14),
            status: TaskStatus::NotStarted,
            priority: Priority::Medium,
        }
    }

    #[test]
    fn status_parses_labels_and_shorthands() {
        assert_eq!("Working on it".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("NOT STARTED".parse::<TaskStatus>().unwrap(), TaskStatus::NotStarted);
        assert_eq!(" done ".parse::<TaskStatus>().unwrap(), TaskStatus::Done);

        let err = "finished-ish".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn priority_orders_by_urgency() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!("critical".parse::<Priority>().unwrap(), Priority::Critical);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn task_serializes_with_display_labels_and_iso_date() {
        let json = serde_json::to_value(essay()).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["due_date"], "2025-03-14");
        assert_eq!(json["status"], "Not Started");
        assert_eq!(json["priority"], "Medium");

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, essay());
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut task = essay();
        TaskPatch {
            priority: Some(Priority::Critical),
            ..TaskPatch::default()
        }
        .apply(&mut task);

        assert_eq!(task.priority, Priority::Critical);
        assert_eq!(task.title, "Essay");
        assert_eq!(task.status, TaskStatus::NotStarted);
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::status(TaskStatus::Done).is_empty());
    }

    #[test]
    fn generated_ids_are_prefixed() {
        let id = TaskId::generate();
        assert!(id.as_str().starts_with("task-"));
        assert_eq!(id.as_str().len(), "task-".len() + 8);
    }
}
