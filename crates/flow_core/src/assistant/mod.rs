//! External workload assistant used by the optimize flow.
//!
//! The board only depends on [`WorkloadAssistant`]; the Gemini client is one
//! implementation and tests plug in deterministic fakes.

mod gemini;

pub use gemini::{GeminiAssistant, PriorityAssignment, apply_ranking, parse_ranking};

use crate::config::AssistantConfig;
use crate::model::Task;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant is not configured: {0}")]
    NotConfigured(String),

    #[error("request failed: {0}")]
    Network(String),

    #[error("assistant returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not parse assistant reply: {0}")]
    Parse(String),

    #[error("assistant returned an empty reply")]
    EmptyResponse,
}

#[async_trait]
pub trait WorkloadAssistant: Send + Sync {
    /// Returns the full replacement collection, reordered and re-prioritized.
    async fn prioritize_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>, AssistantError>;

    /// Returns a short natural-language summary of the workload.
    async fn analyze_workload(&self, tasks: &[Task]) -> Result<String, AssistantError>;
}

pub fn assistant_from_config(
    config: &AssistantConfig,
) -> Result<Box<dyn WorkloadAssistant>, AssistantError> {
    let key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AssistantError::NotConfigured(format!("{} is not set", config.api_key_env)))?;

    Ok(Box::new(GeminiAssistant::new(config, key)?))
}
