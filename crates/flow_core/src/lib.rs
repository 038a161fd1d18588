//! Core of the StudentFlow board: an in-memory task store with automation
//! rules, derived metrics and an assistant-driven optimize flow.

pub mod assistant;
pub mod automation;
pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod optimize;
pub mod seed;

pub use board::Board;
pub use events::BoardEvent;
pub use optimize::OptimizeOutcome;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Priority, Task, TaskId, TaskStatus};
    use time::macros::date;

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: TaskId::new("task-1"),
            title: "demo".to_string(),
            course: "Math 202".to_string(),
            due_date: date!(2025 - 12 - 20),
            status: TaskStatus::NotStarted,
            priority: Priority::Critical,
        };

        assert_eq!(task.id.as_str(), "task-1");
        assert_eq!(task.title, "demo");
        assert_eq!(task.status, TaskStatus::NotStarted);
        assert_eq!(task.priority, Priority::Critical);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("missing title");
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.to_string(), "invalid_input - missing title");
    }

    #[test]
    fn assistant_errors_convert_with_code() {
        let err: AppError = crate::assistant::AssistantError::EmptyResponse.into();
        assert_eq!(err.code(), "assistant_error");
        assert_eq!(err.message(), "assistant returned an empty reply");
    }
}
