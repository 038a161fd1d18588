//! Aggregates derived from the live task collection. Nothing here is cached;
//! callers recompute on every read.

use crate::model::{Task, TaskStatus};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub not_started: usize,
    pub in_progress: usize,
    pub stuck: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::NotStarted => self.not_started,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Stuck => self.stuck,
            TaskStatus::Done => self.done,
        }
    }

    fn bump(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::NotStarted => self.not_started += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Stuck => self.stuck += 1,
            TaskStatus::Done => self.done += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub counts: StatusCounts,
    pub overdue: usize,
    pub completion_ratio: f64,
}

pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        counts.bump(task.status);
    }
    counts
}

/// Overdue means: due midnight (at `now`'s offset) is before `now`, the
/// day-of-month differs from today's, and the task is not done.
///
/// The day-of-month clause is kept as the board has always applied it. It
/// misses tasks overdue by exactly a month with the same day number.
pub fn is_overdue(task: &Task, now: OffsetDateTime) -> bool {
    let due = task.due_date.midnight().assume_offset(now.offset());
    due < now && task.due_date.day() != now.day() && task.status != TaskStatus::Done
}

pub fn overdue_count(tasks: &[Task], now: OffsetDateTime) -> usize {
    tasks.iter().filter(|task| is_overdue(task, now)).count()
}

/// Share of done tasks in `[0, 1]`; an empty board is 0.
pub fn completion_ratio(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let done = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Done)
        .count();
    done as f64 / tasks.len() as f64
}

pub fn completion_percent(tasks: &[Task]) -> u8 {
    (completion_ratio(tasks) * 100.0).round() as u8
}

pub fn board_stats(tasks: &[Task], now: OffsetDateTime) -> BoardStats {
    BoardStats {
        total: tasks.len(),
        counts: status_counts(tasks),
        overdue: overdue_count(tasks, now),
        completion_ratio: completion_ratio(tasks),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        board_stats, completion_percent, completion_ratio, is_overdue, overdue_count,
        status_counts,
    };
    use crate::model::{Priority, Task, TaskId, TaskStatus};
    use time::Date;
    use time::macros::{date, datetime};

    fn task(id: &str, due_date: Date, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(id),
            title: format!("task {id}"),
            course: "Math 202".to_string(),
            due_date,
            status,
            priority: Priority::Medium,
        }
    }

    #[test]
    fn completion_ratio_handles_empty_and_full_boards() {
        assert_eq!(completion_ratio(&[]), 0.0);

        let all_done = vec![
            task("1", date!(2025 - 01 - 01), TaskStatus::Done),
            task("2", date!(2025 - 01 - 02), TaskStatus::Done),
        ];
        assert_eq!(completion_ratio(&all_done), 1.0);
        assert_eq!(completion_percent(&all_done), 100);
    }

    #[test]
    fn completion_percent_rounds() {
        let tasks = vec![
            task("1", date!(2025 - 01 - 01), TaskStatus::Done),
            task("2", date!(2025 - 01 - 02), TaskStatus::Stuck),
            task("3", date!(2025 - 01 - 03), TaskStatus::NotStarted),
        ];
        assert_eq!(completion_percent(&tasks), 33);
    }

    #[test]
    fn status_counts_cover_every_status() {
        let tasks = vec![
            task("1", date!(2025 - 01 - 01), TaskStatus::Done),
            task("2", date!(2025 - 01 - 02), TaskStatus::Stuck),
            task("3", date!(2025 - 01 - 03), TaskStatus::Stuck),
            task("4", date!(2025 - 01 - 04), TaskStatus::InProgress),
        ];
        let counts = status_counts(&tasks);

        assert_eq!(counts.get(TaskStatus::NotStarted), 0);
        assert_eq!(counts.get(TaskStatus::InProgress), 1);
        assert_eq!(counts.get(TaskStatus::Stuck), 2);
        assert_eq!(counts.get(TaskStatus::Done), 1);
    }

    #[test]
    fn yesterday_is_overdue_unless_done() {
        let now = datetime!(2025-03-15 10:00 UTC);

        assert!(is_overdue(&task("1", date!(2025 - 03 - 14), TaskStatus::Stuck), now));
        assert!(!is_overdue(&task("2", date!(2025 - 03 - 14), TaskStatus::Done), now));
    }

    #[test]
    fn today_and_future_are_not_overdue() {
        let now = datetime!(2025-03-15 10:00 UTC);

        assert!(!is_overdue(&task("1", date!(2025 - 03 - 15), TaskStatus::NotStarted), now));
        assert!(!is_overdue(&task("2", date!(2025 - 03 - 20), TaskStatus::NotStarted), now));
    }

    #[test]
    fn same_day_of_previous_month_slips_through() {
        let now = datetime!(2025-03-15 10:00 UTC);

        assert!(!is_overdue(&task("1", date!(2025 - 02 - 15), TaskStatus::NotStarted), now));
        assert!(is_overdue(&task("2", date!(2025 - 02 - 16), TaskStatus::NotStarted), now));
    }

    #[test]
    fn board_stats_bundles_metrics() {
        let now = datetime!(2025-03-15 10:00 UTC);
        let tasks = vec![
            task("1", date!(2025 - 03 - 10), TaskStatus::Stuck),
            task("2", date!(2025 - 03 - 11), TaskStatus::Done),
            task("3", date!(2025 - 03 - 20), TaskStatus::InProgress),
            task("4", date!(2025 - 03 - 12), TaskStatus::NotStarted),
        ];
        let stats = board_stats(&tasks, now);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.overdue, 2);
        assert_eq!(overdue_count(&tasks, now), 2);
        assert_eq!(stats.counts.done, 1);
        assert_eq!(stats.completion_ratio, 0.25);
    }
}
