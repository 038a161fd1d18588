use crate::model::{LogEntry, Task, TaskId};

/// Change notifications published by [`crate::board::Board`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    TaskAdded(Task),
    TaskUpdated(Task),
    TaskDeleted(TaskId),
    TasksReplaced { count: usize },
    LogAppended(LogEntry),
    InsightChanged(Option<String>),
    BusyChanged(bool),
}

pub(crate) const EVENT_CAPACITY: usize = 64;
