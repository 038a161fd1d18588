use crate::model::{LogEntry, LogKind};
use std::collections::VecDeque;

pub const LOG_CAPACITY: usize = 5;

/// Most-recent-first feed holding at most [`LOG_CAPACITY`] entries.
#[derive(Debug, Clone, Default)]
pub struct AutomationLog {
    entries: VecDeque<LogEntry>,
}

impl AutomationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append<M: Into<String>>(&mut self, message: M, kind: LogKind) -> LogEntry {
        let entry = LogEntry::new(message, kind);
        self.entries.push_front(entry.clone());
        self.entries.truncate(LOG_CAPACITY);
        entry
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{AutomationLog, LOG_CAPACITY};
    use crate::model::LogKind;

    #[test]
    fn append_puts_newest_first() {
        let mut log = AutomationLog::new();
        log.append("first", LogKind::System);
        log.append("second", LogKind::Email);

        let messages: Vec<&str> = log.entries().map(|entry| entry.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn append_evicts_oldest_beyond_capacity() {
        let mut log = AutomationLog::new();
        for index in 0..12 {
            log.append(format!("message {index}"), LogKind::Status);
            assert!(log.len() <= LOG_CAPACITY);
        }

        let messages: Vec<String> = log.entries().map(|entry| entry.message.clone()).collect();
        assert_eq!(
            messages,
            vec![
                "message 11",
                "message 10",
                "message 9",
                "message 8",
                "message 7",
            ]
        );
    }

    #[test]
    fn entries_get_distinct_ids() {
        let mut log = AutomationLog::new();
        let first = log.append("same", LogKind::System);
        let second = log.append("same", LogKind::System);

        assert_ne!(first.id, second.id);
        assert!(!log.is_empty());
    }
}
