use crate::error::AppError;
use crate::model::LogEntry;
use crate::notify::{Notifier, toast_title};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, entry: &LogEntry) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&toast_title(entry))
            .text1(&entry.message)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
