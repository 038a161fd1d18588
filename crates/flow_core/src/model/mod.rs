mod course;
mod log;
mod task;

pub use course::{Course, find_course};
pub use log::{LogEntry, LogKind};
pub use task::{NewTask, Priority, Task, TaskId, TaskPatch, TaskStatus};
