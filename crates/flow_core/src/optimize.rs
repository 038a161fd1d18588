//! AI optimization flow: prioritize, replace the board, then summarize.

use crate::assistant::{AssistantError, WorkloadAssistant};
use crate::automation::rules::{OPTIMIZED_MESSAGE, OPTIMIZE_FAILED_MESSAGE};
use crate::board::Board;
use crate::error::AppError;
use crate::model::LogKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizeOutcome {
    Completed { insight: String },
    /// Another run was in flight; nothing was called or logged.
    AlreadyRunning,
}

impl Board {
    /// At most one run is in flight per board. A failure in either step is
    /// logged and returned; tasks replaced by a successful first step stay.
    pub async fn optimize(
        &self,
        assistant: &dyn WorkloadAssistant,
    ) -> Result<OptimizeOutcome, AppError> {
        let Some(_busy) = self.try_begin_busy() else {
            tracing::debug!("optimize requested while a run is in flight, ignoring");
            return Ok(OptimizeOutcome::AlreadyRunning);
        };

        tracing::info!(tasks = self.len(), "optimizing board");
        match self.run_optimize(assistant).await {
            Ok(insight) => {
                tracing::info!("board optimization finished");
                Ok(OptimizeOutcome::Completed { insight })
            }
            Err(err) => {
                tracing::error!(error = %err, "board optimization failed");
                self.append_log(OPTIMIZE_FAILED_MESSAGE, LogKind::System);
                Err(err.into())
            }
        }
    }

    async fn run_optimize(&self, assistant: &dyn WorkloadAssistant) -> Result<String, AssistantError> {
        let current = self.tasks();
        let prioritized = assistant.prioritize_tasks(&current).await?;
        self.replace_tasks(prioritized.clone());
        self.append_log(OPTIMIZED_MESSAGE, LogKind::System);

        let insight = assistant.analyze_workload(&prioritized).await?;
        self.set_insight(insight.clone());
        Ok(insight)
    }
}
