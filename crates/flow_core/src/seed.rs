//! Demo board shown when a session starts with `seed_demo` enabled.

use crate::model::{Course, Priority, Task, TaskId, TaskStatus};
use time::{Date, Duration};

pub fn demo_courses() -> Vec<Course> {
    vec![
        Course::new("c1", "History 101", "yellow"),
        Course::new("c2", "Math 202", "blue"),
        Course::new("c3", "CS 305", "purple"),
        Course::new("c4", "Psychology", "pink"),
    ]
}

/// Four assignments with due dates relative to `today`, one already overdue.
pub fn demo_tasks(today: Date) -> Vec<Task> {
    let offset = |days: i64| today.saturating_add(Duration::days(days));

    vec![
        Task {
            id: TaskId::new("1"),
            title: "Research Paper Draft".to_string(),
            course: "History 101".to_string(),
            due_date: offset(2),
            status: TaskStatus::InProgress,
            priority: Priority::High,
        },
        Task {
            id: TaskId::new("2"),
            title: "Linear Algebra Quiz".to_string(),
            course: "Math 202".to_string(),
            due_date: offset(5),
            status: TaskStatus::NotStarted,
            priority: Priority::Medium,
        },
        Task {
            id: TaskId::new("3"),
            title: "React Project UI".to_string(),
            course: "CS 305".to_string(),
            due_date: offset(-1),
            status: TaskStatus::Stuck,
            priority: Priority::Critical,
        },
        Task {
            id: TaskId::new("4"),
            title: "Read Chapter 4-5".to_string(),
            course: "Psychology".to_string(),
            due_date: offset(10),
            status: TaskStatus::Done,
            priority: Priority::Low,
        },
    ]
}
