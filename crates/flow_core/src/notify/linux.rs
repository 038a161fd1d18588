use crate::error::AppError;
use crate::model::LogEntry;
use crate::notify::{Notifier, toast_title};
use notify_rust::Notification;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, entry: &LogEntry) -> Result<(), AppError> {
        Notification::new()
            .summary(&toast_title(entry))
            .body(&entry.message)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
