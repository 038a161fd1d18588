//! State-change rules that feed the automation log.

use crate::model::{Task, TaskPatch, TaskStatus};
use time::{Date, Duration, OffsetDateTime};

pub const OPTIMIZED_MESSAGE: &str = "AI Automation: Board priorities optimized by Gemini.";
pub const OPTIMIZE_FAILED_MESSAGE: &str = "AI Error: Could not optimize board.";

const SECONDS_PER_DAY: i64 = 86_400;

pub fn task_added_message(title: &str) -> String {
    format!("New assignment \"{title}\" added to board.")
}

pub fn reminder_message(title: &str) -> String {
    format!("Automation: 📧 Reminder email drafted for \"{title}\" due soon.")
}

pub fn completed_message(title: &str) -> String {
    format!("Automation: 🎉 \"{title}\" completed! Progress bar updated.")
}

/// Due date taken as midnight UTC; anything already past also counts.
/// A window too wide to represent covers every date.
pub fn is_due_soon(due_date: Date, now: OffsetDateTime, window_days: i64) -> bool {
    let Some(window) = window_days.checked_mul(SECONDS_PER_DAY).map(Duration::seconds) else {
        return window_days > 0;
    };
    let due = due_date.midnight().assume_utc();
    due - now < window
}

/// Only a move from a non-done status into `Done` counts as completion.
pub fn completes(previous: &Task, patch: &TaskPatch) -> bool {
    previous.status != TaskStatus::Done && patch.status == Some(TaskStatus::Done)
}
