//! Gemini `generateContent` client.

use super::{AssistantError, WorkloadAssistant};
use crate::config::AssistantConfig;
use crate::model::{Priority, Task, TaskId};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct GeminiAssistant {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

/// One entry of the ranking the model sends back, most urgent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityAssignment {
    pub id: TaskId,
    pub priority: Priority,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct RawAssignment {
    id: String,
    priority: String,
}

impl GeminiAssistant {
    pub fn new(config: &AssistantConfig, api_key: String) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AssistantError::Network(err.to_string()))?;

        Ok(Self::with_client(config, api_key, client))
    }

    pub fn with_client(config: &AssistantConfig, api_key: String, client: Client) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    async fn generate(&self, prompt: String, json_reply: bool) -> Result<String, AssistantError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: json_reply.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        tracing::debug!(model = %self.model, json_reply, "sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AssistantError::Network(format!("request timeout: {err}"))
                } else if err.is_connect() {
                    AssistantError::Network(format!("connection failed: {err}"))
                } else {
                    AssistantError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AssistantError::Network(err.to_string()))?;

        if !status.is_success() {
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_text(&body)
    }
}

#[async_trait]
impl WorkloadAssistant for GeminiAssistant {
    async fn prioritize_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>, AssistantError> {
        let reply = self.generate(prioritize_prompt(tasks)?, true).await?;
        let ranking = parse_ranking(&reply)?;
        Ok(apply_ranking(tasks, &ranking))
    }

    async fn analyze_workload(&self, tasks: &[Task]) -> Result<String, AssistantError> {
        let reply = self.generate(analyze_prompt(tasks)?, false).await?;
        let summary = reply.trim();
        if summary.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(summary.to_string())
    }
}

fn prioritize_prompt(tasks: &[Task]) -> Result<String, AssistantError> {
    let payload =
        serde_json::to_string_pretty(tasks).map_err(|err| AssistantError::Parse(err.to_string()))?;
    Ok(format!(
        "You are an academic planner helping a student. Re-evaluate the priority of each \
         assignment below from its due date, status and title. Reply with a JSON array of \
         objects {{\"id\": string, \"priority\": \"Critical\" | \"High\" | \"Medium\" | \"Low\"}}, \
         one per assignment, ordered from most to least urgent.\n\nAssignments:\n{payload}"
    ))
}

fn analyze_prompt(tasks: &[Task]) -> Result<String, AssistantError> {
    let payload =
        serde_json::to_string_pretty(tasks).map_err(|err| AssistantError::Parse(err.to_string()))?;
    Ok(format!(
        "Summarize this student's workload in one short, encouraging paragraph of at most two \
         sentences. Mention what to focus on first.\n\nAssignments:\n{payload}"
    ))
}

fn extract_text(body: &str) -> Result<String, AssistantError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|err| AssistantError::Parse(format!("{err}, body: {body}")))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AssistantError::EmptyResponse);
    }
    Ok(text)
}

pub fn parse_ranking(reply: &str) -> Result<Vec<PriorityAssignment>, AssistantError> {
    let raw: Vec<RawAssignment> = serde_json::from_str(strip_code_fence(reply))
        .map_err(|err| AssistantError::Parse(err.to_string()))?;

    raw.into_iter()
        .map(|entry| {
            let priority = entry
                .priority
                .parse::<Priority>()
                .map_err(|err| AssistantError::Parse(err.message().to_string()))?;
            Ok(PriorityAssignment {
                id: TaskId::new(entry.id),
                priority,
            })
        })
        .collect()
}

/// Reorders `tasks` by `ranking` and applies its priorities. Tasks the
/// ranking skips keep their priority and follow in their previous order;
/// unknown or repeated ids are ignored.
pub fn apply_ranking(tasks: &[Task], ranking: &[PriorityAssignment]) -> Vec<Task> {
    let mut remaining: Vec<Option<Task>> = tasks.iter().cloned().map(Some).collect();
    let mut ordered = Vec::with_capacity(tasks.len());

    for assignment in ranking {
        let slot = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|task| task.id == assignment.id));
        if let Some(mut task) = slot.and_then(Option::take) {
            task.priority = assignment.priority;
            ordered.push(task);
        }
    }

    ordered.extend(remaining.into_iter().flatten());
    ordered
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
