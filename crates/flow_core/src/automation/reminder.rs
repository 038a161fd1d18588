use crate::model::TaskId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

type Pending = HashMap<TaskId, (u64, CancellationToken)>;

/// One-shot delayed callbacks keyed by task id.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    delay: Duration,
    pending: Arc<Mutex<Pending>>,
    generation: Arc<AtomicU64>,
}

impl ReminderScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns `false` when no tokio runtime is available to run the timer.
    pub fn schedule<F>(&self, id: TaskId, fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(task_id = %id, "no async runtime, reminder skipped");
            return false;
        };

        let token = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        if let Some((_, previous)) = self.lock().insert(id.clone(), (generation, token.clone())) {
            previous.cancel();
        }

        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(task_id = %id, "reminder cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    {
                        let mut pending = pending.lock().unwrap_or_else(PoisonError::into_inner);
                        if pending.get(&id).is_some_and(|(current, _)| *current == generation) {
                            pending.remove(&id);
                        }
                    }
                    fire();
                }
            }
        });

        true
    }

    pub fn cancel(&self, id: &TaskId) -> bool {
        match self.lock().remove(id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: &TaskId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
