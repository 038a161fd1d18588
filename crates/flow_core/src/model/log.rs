use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use ulid::Ulid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Email,
    Status,
    System,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Status => "status",
            Self::System => "system",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub kind: LogKind,
}

impl LogEntry {
    pub fn new<M: Into<String>>(message: M, kind: LogKind) -> Self {
        Self {
            id: Ulid::new().to_string(),
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
            kind,
        }
    }
}
