// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary generation via the Anthropic Messages API.
//!
//! The merged activity is rendered into a deterministic plain-text digest,
//! sent as a single user message with `stream: true`, and the text deltas
//! of the response are forwarded through a channel as they arrive.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{EnrichedCommit, IssueOrPr};
use crate::stream::{Frame, FrameBuffer};
use crate::time_utils::format_utc_date;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.5;

/// Sentinel appended once the summary text is exhausted.
pub const DONE_SENTINEL: &str = "[DONE]";

const ENTRY_SEPARATOR: &str = "\n---\n";

/// Streaming summary client.
#[derive(Clone)]
pub struct SummaryService {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl SummaryService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gh-activity/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.anthropic_api_url.trim_end_matches('/').to_string(),
            api_key: config.anthropic_api_key.clone(),
            model: config.anthropic_model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request a streamed summary of the given activity.
    ///
    /// Fails before streaming when no API key is configured or the API
    /// rejects the request. Errors after the first chunk arrive through the
    /// channel, which closes when the response ends.
    pub async fn stream_summary(
        &self,
        commits: &[EnrichedCommit],
        issues_and_prs: &[IssueOrPr],
    ) -> Result<mpsc::Receiver<Result<String, AppError>>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Summary("Anthropic API key not configured".to_string()))?;

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "stream": true,
            "messages": [
                { "role": "user", "content": build_prompt(commits, issues_and_prs) }
            ],
        });

        tracing::info!(
            model = %self.model,
            commits = commits.len(),
            issues_and_prs = issues_and_prs.len(),
            "Requesting activity summary"
        );

        let response = self
            .http
            .post(format!("{}/v1/messages", self.api_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Summary(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(AppError::Summary(format!("HTTP {}: {}", status, message)));
        }

        let (tx, rx) = mpsc::channel(64);
        let mut bytes = response.bytes_stream();

        tokio::spawn(async move {
            let mut buffer = FrameBuffer::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(AppError::Summary(e.to_string()))).await;
                        return;
                    }
                };

                for frame in buffer.push(&chunk) {
                    match text_delta(&frame) {
                        Ok(Some(text)) => {
                            if tx.send(Ok(text)).await.is_err() {
                                // Receiver dropped
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }
                }
            }

            if let Some(frame) = buffer.finish() {
                if let Ok(Some(text)) = text_delta(&frame) {
                    let _ = tx.send(Ok(text)).await;
                }
            }
        });

        Ok(rx)
    }
}

// ─── Prompt ──────────────────────────────────────────────────────────────────

/// Render the activity digest and instruction template.
pub fn build_prompt(commits: &[EnrichedCommit], issues_and_prs: &[IssueOrPr]) -> String {
    let commits_text = commits
        .iter()
        .map(|commit| {
            format!(
                "Repository: {}\nMessage: {}\nChanges: +{} -{} lines\nDate: {}",
                commit.repository.name_with_owner,
                commit.message_headline,
                commit.additions,
                commit.deletions,
                format_utc_date(commit.committed_date)
            )
        })
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR);

    let items_text = issues_and_prs
        .iter()
        .map(|item| {
            format!(
                "Type: {}\nRepository: {}\nTitle: {}\nState: {}\nNumber: #{}\nUpdated: {}",
                if item.is_pr() { "PR" } else { "ISSUE" },
                item.repository.name_with_owner,
                item.title,
                item.state,
                item.number,
                format_utc_date(item.updated_at)
            )
        })
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR);

    format!(
        "Please analyze the following GitHub activity and provide a clear, concise summary in markdown format. Focus on the most significant changes and patterns.

COMMITS:
{commits_text}

ISSUES AND PULL REQUESTS:
{items_text}

Please structure your response in markdown with:
1. A brief overview of total activity
2. Key highlights and patterns
3. Most significant changes or contributions
4. Notable repositories worked on

Keep the summary professional and focused on technical details. Use bullet points and sections to organize the information."
    )
}

// ─── Response stream ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    Error { error: ApiErrorBody },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Extract the text carried by one response frame, if any.
fn text_delta(frame: &Frame) -> Result<Option<String>, AppError> {
    if frame.data.is_empty() {
        return Ok(None);
    }

    let event: StreamEvent = serde_json::from_str(&frame.data)
        .map_err(|e| AppError::Summary(format!("Failed to parse stream event: {}", e)))?;

    match event {
        StreamEvent::ContentBlockDelta {
            delta: Delta::TextDelta { text },
        } if !text.is_empty() => Ok(Some(text)),
        StreamEvent::Error { error } => Err(AppError::Summary(error.message)),
        _ => Ok(None),
    }
}
