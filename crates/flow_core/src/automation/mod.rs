mod log;
mod reminder;
pub mod rules;

pub use log::{AutomationLog, LOG_CAPACITY};
pub use reminder::ReminderScheduler;

use std::time::Duration;

/// Knobs for the automation rules; the defaults mirror the board's stock behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomationSettings {
    pub reminder_delay: Duration,
    pub due_soon_days: i64,
    pub cancel_reminders_on_delete: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            reminder_delay: Duration::from_millis(1000),
            due_soon_days: 3,
            cancel_reminders_on_delete: false,
        }
    }
}
