//! The board store: tasks, automation log and insight for one session.

use crate::automation::{AutomationLog, AutomationSettings, ReminderScheduler, rules};
use crate::error::AppError;
use crate::events::{BoardEvent, EVENT_CAPACITY};
use crate::metrics::{self, BoardStats};
use crate::model::{Course, LogEntry, LogKind, NewTask, Task, TaskId, TaskPatch, find_course};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::broadcast;

/// Cloneable handle; clones share the same board.
#[derive(Clone)]
pub struct Board {
    inner: Arc<BoardInner>,
}

struct BoardInner {
    state: Mutex<BoardState>,
    events: broadcast::Sender<BoardEvent>,
    busy: AtomicBool,
    reminders: ReminderScheduler,
    settings: AutomationSettings,
    courses: Vec<Course>,
}

#[derive(Default)]
struct BoardState {
    tasks: Vec<Task>,
    log: AutomationLog,
    insight: Option<String>,
}

/// Clears the busy flag when the optimize flow exits, however it exits.
pub(crate) struct BusyGuard<'a> {
    board: &'a Board,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.board.inner.busy.store(false, Ordering::SeqCst);
        self.board.emit(BoardEvent::BusyChanged(false));
    }
}

impl Board {
    pub fn new(courses: Vec<Course>, tasks: Vec<Task>, settings: AutomationSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(BoardInner {
                state: Mutex::new(BoardState {
                    tasks,
                    ..BoardState::default()
                }),
                events,
                busy: AtomicBool::new(false),
                reminders: ReminderScheduler::new(settings.reminder_delay),
                settings,
                courses,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.inner.events.subscribe()
    }

    pub fn add_task(&self, fields: NewTask) -> Result<Task, AppError> {
        let title = fields.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }
        let fields = NewTask { title, ..fields };

        let (task, entry) = {
            let mut state = self.state();
            let id = loop {
                let candidate = TaskId::generate();
                if !state.tasks.iter().any(|task| task.id == candidate) {
                    break candidate;
                }
            };
            let task = fields.into_task(id);
            state.tasks.insert(0, task.clone());
            let entry = state
                .log
                .append(rules::task_added_message(&task.title), LogKind::System);
            (task, entry)
        };

        tracing::debug!(task_id = %task.id, title = %task.title, "task added");
        self.emit(BoardEvent::TaskAdded(task.clone()));
        self.emit(BoardEvent::LogAppended(entry));

        let now = OffsetDateTime::now_utc();
        if rules::is_due_soon(task.due_date, now, self.inner.settings.due_soon_days) {
            self.schedule_reminder(&task);
        }

        Ok(task)
    }

    /// Unknown ids are ignored and yield `Ok(None)`. A blank title is
    /// rejected before anything changes.
    pub fn update_task(&self, id: &TaskId, mut patch: TaskPatch) -> Result<Option<Task>, AppError> {
        if let Some(title) = patch.title.take() {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError::invalid_input("title is required"));
            }
            patch.title = Some(title.to_string());
        }

        let (updated, entry) = {
            let mut state = self.state();
            let Some(task) = state.tasks.iter_mut().find(|task| &task.id == id) else {
                return Ok(None);
            };
            let completion = rules::completes(task, &patch)
                .then(|| rules::completed_message(&task.title));
            patch.apply(task);
            let updated = task.clone();
            let entry = completion.map(|message| state.log.append(message, LogKind::Status));
            (updated, entry)
        };

        tracing::debug!(task_id = %id, status = %updated.status, "task updated");
        self.emit(BoardEvent::TaskUpdated(updated.clone()));
        if let Some(entry) = entry {
            self.emit(BoardEvent::LogAppended(entry));
        }
        Ok(Some(updated))
    }

    /// Unknown ids are ignored and yield `None`.
    pub fn delete_task(&self, id: &TaskId) -> Option<Task> {
        let removed = {
            let mut state = self.state();
            let index = state.tasks.iter().position(|task| &task.id == id)?;
            state.tasks.remove(index)
        };

        if self.inner.settings.cancel_reminders_on_delete && self.inner.reminders.cancel(id) {
            tracing::debug!(task_id = %id, "pending reminder cancelled");
        }
        tracing::debug!(task_id = %id, "task deleted");
        self.emit(BoardEvent::TaskDeleted(id.clone()));
        Some(removed)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state().tasks.clone()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.state().tasks.iter().find(|task| &task.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().tasks.is_empty()
    }

    pub fn courses(&self) -> &[Course] {
        &self.inner.courses
    }

    pub fn course_for(&self, task: &Task) -> Option<&Course> {
        find_course(&self.inner.courses, &task.course)
    }

    pub fn append_log<M: Into<String>>(&self, message: M, kind: LogKind) -> LogEntry {
        let entry = self.state().log.append(message, kind);
        self.emit(BoardEvent::LogAppended(entry.clone()));
        entry
    }

    /// Most recent first.
    pub fn log(&self) -> Vec<LogEntry> {
        self.state().log.to_vec()
    }

    pub fn insight(&self) -> Option<String> {
        self.state().insight.clone()
    }

    /// Returns whether there was an insight to dismiss.
    pub fn dismiss_insight(&self) -> bool {
        let dismissed = self.state().insight.take().is_some();
        if dismissed {
            self.emit(BoardEvent::InsightChanged(None));
        }
        dismissed
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::SeqCst)
    }

    pub fn pending_reminders(&self) -> usize {
        self.inner.reminders.pending_count()
    }

    pub fn stats(&self) -> BoardStats {
        self.stats_at(local_now())
    }

    pub fn stats_at(&self, now: OffsetDateTime) -> BoardStats {
        metrics::board_stats(&self.state().tasks, now)
    }

    pub(crate) fn try_begin_busy(&self) -> Option<BusyGuard<'_>> {
        self.inner
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.emit(BoardEvent::BusyChanged(true));
        Some(BusyGuard { board: self })
    }

    pub(crate) fn replace_tasks(&self, tasks: Vec<Task>) {
        let count = tasks.len();
        self.state().tasks = tasks;
        self.emit(BoardEvent::TasksReplaced { count });
    }

    pub(crate) fn set_insight(&self, insight: String) {
        self.state().insight = Some(insight.clone());
        self.emit(BoardEvent::InsightChanged(Some(insight)));
    }

    fn schedule_reminder(&self, task: &Task) {
        let board = Arc::downgrade(&self.inner);
        let message = rules::reminder_message(&task.title);
        let scheduled = self.inner.reminders.schedule(task.id.clone(), move || {
            if let Some(inner) = board.upgrade() {
                Board { inner }.append_log(message, LogKind::Email);
            }
        });
        if scheduled {
            tracing::debug!(task_id = %task.id, delay = ?self.inner.settings.reminder_delay, "reminder scheduled");
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: BoardEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

pub fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}
